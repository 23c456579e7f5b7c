// Gateway module for origin access
mod http;
mod traits;
mod types;

pub use http::HttpOrigin;
pub use traits::Origin;
#[cfg(test)]
pub use traits::MockOrigin;
pub use types::ProbeInfo;
