pub mod app;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod maintenance;
pub mod origin;
pub mod stations;
pub mod utils;

pub use app::{load_config, Config};
pub use cache::{CachedFetcher, ContentKey, FetchOutcome, FetchSource, FileCache, FreshnessPolicy};
pub use origin::{HttpOrigin, Origin, ProbeInfo};
pub use utils::CacheError;
