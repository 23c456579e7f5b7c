// Gateway module for cache maintenance - scan, filter, report and remove
// cached files without going through the fetch path
mod actions;
mod filter;
mod scanner;
mod types;

pub use actions::{clean, remove, CacheReport};
pub use filter::{filter, FilterCriteria};
pub use scanner::classify;
pub use types::{CacheFileKind, CacheFileRecord, CacheScan};
