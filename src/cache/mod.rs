mod cache_manager;
mod file_cache;
mod policy;
mod types;

pub use cache_manager::CachedFetcher;
pub use file_cache::FileCache;
pub use policy::{days_before, start_of_year, FreshnessPolicy};
pub use types::{ContentKey, FetchOutcome, FetchSource, FetchStats};
