use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key for cache entries, derived from the last segment of a URI
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey(String);

impl ContentKey {
    /// Take the final `/`-delimited segment of the URI and strip `:` characters.
    ///
    /// Two URIs sharing a trailing segment map to the same key; archive
    /// filenames are unique so this is acceptable.
    pub fn from_uri(uri: &str) -> Self {
        let segment = uri.rsplit('/').next().unwrap_or(uri);
        Self(segment.chars().filter(|c| *c != ':').collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the content of a fetch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Cache,
    Origin,
}

/// Result of a fetch. Absent content means "no data available", not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub source: FetchSource,
    pub content: Option<Bytes>,
}

impl FetchOutcome {
    pub fn cache(content: Option<Bytes>) -> Self {
        Self {
            source: FetchSource::Cache,
            content,
        }
    }

    pub fn origin(content: Option<Bytes>) -> Self {
        Self {
            source: FetchSource::Origin,
            content,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.as_ref().map_or(true, |c| c.is_empty())
    }
}

/// Session counters for a fetcher
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub cache_hits: usize,
    pub probes: usize,
    pub retrievals: usize,
    pub empty_retrievals: usize,
}

impl FetchStats {
    /// Format fetch stats for display
    pub fn format(&self) -> String {
        format!(
            "Fetch Statistics:\n  \
            served from cache: {}\n  \
            origin probes: {}\n  \
            origin retrievals: {} ({} empty)",
            self.cache_hits, self.probes, self.retrievals, self.empty_retrievals
        )
    }
}
