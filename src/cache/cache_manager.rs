use bytes::Bytes;
use chrono::{DateTime, Local, Utc};
use parking_lot::Mutex;
use std::path::PathBuf;
use tracing::{debug, info};

use super::file_cache::FileCache;
use super::policy::{days_before, start_of_year, FreshnessPolicy};
use super::types::{ContentKey, FetchOutcome, FetchStats};
use crate::origin::{Origin, ProbeInfo};
use crate::utils::{Clock, Result, SystemClock};

/// Serves resources from the local cache or the origin according to a
/// freshness policy, keeping the cache up to date.
pub struct CachedFetcher<O> {
    store: Option<FileCache>,
    origin: O,
    clock: Box<dyn Clock>,
    stats: Mutex<FetchStats>,
}

impl<O: Origin> CachedFetcher<O> {
    /// Create a fetcher. `None` disables caching: every fetch goes to the origin.
    pub fn new(cache_dir: Option<PathBuf>, origin: O) -> Self {
        Self {
            store: cache_dir.map(FileCache::new),
            origin,
            clock: Box::new(SystemClock),
            stats: Mutex::new(FetchStats::default()),
        }
    }

    /// Replace the clock used for cutoff computations
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> Option<&FileCache> {
        self.store.as_ref()
    }

    pub fn stats(&self) -> FetchStats {
        *self.stats.lock()
    }

    /// Parse `directive` and fetch. Invalid directives fail before any I/O.
    pub async fn fetch_with(&self, uri: &str, directive: &str) -> Result<FetchOutcome> {
        let policy: FreshnessPolicy = directive.parse()?;
        self.fetch(uri, policy).await
    }

    /// Fetch `uri` under `policy`
    pub async fn fetch(&self, uri: &str, policy: FreshnessPolicy) -> Result<FetchOutcome> {
        let Some(store) = &self.store else {
            debug!("caching disabled, retrieving {}", uri);
            let content = self.retrieve(uri).await;
            return Ok(FetchOutcome::origin(content));
        };

        let key = ContentKey::from_uri(uri);
        debug!("fetching {} as {} with policy {}", uri, key, policy);

        match policy {
            FreshnessPolicy::Never => self.serve_cached(store, &key),
            FreshnessPolicy::Always => self.fetch_always(store, uri, &key).await,
            FreshnessPolicy::Yearly => {
                let cutoff = start_of_year(self.clock.now());
                self.fetch_since(store, uri, &key, Some(cutoff)).await
            }
            FreshnessPolicy::WithinDays(days) => {
                let cutoff = days_before(self.clock.now(), days);
                self.fetch_since(store, uri, &key, cutoff).await
            }
        }
    }

    async fn fetch_always(
        &self,
        store: &FileCache,
        uri: &str,
        key: &ContentKey,
    ) -> Result<FetchOutcome> {
        let Some(cached_at) = store.modified(key)? else {
            return self.retrieve_and_store(store, uri, key).await;
        };

        let info = self.probe(uri).await?;
        if origin_is_newer(&info, cached_at) {
            info!("{} changed at origin, refreshing", key);
            self.retrieve_and_store(store, uri, key).await
        } else {
            self.serve_cached(store, key)
        }
    }

    /// Shared by `Yearly` and `WithinDays`. A `None` cutoff lies before
    /// anything representable, so every cached entry passes it.
    async fn fetch_since(
        &self,
        store: &FileCache,
        uri: &str,
        key: &ContentKey,
        cutoff: Option<DateTime<Local>>,
    ) -> Result<FetchOutcome> {
        let cached_at = store.modified(key)?;

        if let Some(cached_at) = cached_at {
            let fresh = cutoff.map_or(true, |cutoff| cached_at >= cutoff.with_timezone(&Utc));
            if fresh {
                return self.serve_cached(store, key);
            }
            debug!("{} older than cutoff {:?}", key, cutoff);
        }

        let info = self.probe(uri).await?;
        match cached_at {
            Some(cached_at) if !origin_is_newer(&info, cached_at) => {
                debug!("{} past cutoff but not older than origin", key);
                self.serve_cached(store, key)
            }
            _ => self.retrieve_and_store(store, uri, key).await,
        }
    }

    fn serve_cached(&self, store: &FileCache, key: &ContentKey) -> Result<FetchOutcome> {
        let content = store.load(key)?;
        if content.is_some() {
            self.stats.lock().cache_hits += 1;
        }
        Ok(FetchOutcome::cache(content))
    }

    /// Retrieve and, when something came back, overwrite the cache entry.
    /// Absent content leaves the existing entry untouched.
    async fn retrieve_and_store(
        &self,
        store: &FileCache,
        uri: &str,
        key: &ContentKey,
    ) -> Result<FetchOutcome> {
        let content = self.retrieve(uri).await;
        if let Some(data) = &content {
            store.store(key, data)?;
        }
        Ok(FetchOutcome::origin(content))
    }

    async fn probe(&self, uri: &str) -> Result<ProbeInfo> {
        self.stats.lock().probes += 1;
        self.origin.probe(uri).await
    }

    async fn retrieve(&self, uri: &str) -> Option<Bytes> {
        let content = self.origin.retrieve(uri).await;
        let mut stats = self.stats.lock();
        stats.retrievals += 1;
        if content.is_none() {
            stats.empty_retrievals += 1;
        }
        content
    }
}

/// Origin counts as newer when it reports a strictly later modification
/// time, or reports none at all.
fn origin_is_newer(info: &ProbeInfo, cached_at: DateTime<Utc>) -> bool {
    info.modified.map_or(true, |modified| modified > cached_at)
}
