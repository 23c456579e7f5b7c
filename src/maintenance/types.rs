use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Maintenance classification of a cached file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheFileKind {
    /// Station data whose id is protected by an alias
    Active,
    /// Station data nothing refers to
    Discardable,
    /// Station/country listing files
    Catalog,
}

impl FromStr for CacheFileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "discardable" => Ok(Self::Discardable),
            "catalog" => Ok(Self::Catalog),
            other => Err(format!(
                "unknown file type {:?} (expected active, discardable or catalog)",
                other
            )),
        }
    }
}

impl fmt::Display for CacheFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Discardable => "discardable",
            Self::Catalog => "catalog",
        };
        f.write_str(label)
    }
}

/// A classified file under the cache root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheFileRecord {
    /// Station id for data files, catalog suffix (`stations`, `countries`, ...) otherwise
    pub id: String,
    pub kind: CacheFileKind,
    pub size_bytes: u64,
    pub modified: DateTime<Utc>,
    /// Whole days since last modification
    pub age_days: i64,
    pub path: PathBuf,
    pub country: Option<String>,
    pub region: Option<String>,
    pub location: Option<String>,
}

impl CacheFileRecord {
    /// Size in kilobytes, rounded to nearest
    pub fn size_kb(&self) -> u64 {
        kilobytes(self.size_bytes)
    }
}

pub(crate) fn kilobytes(bytes: u64) -> u64 {
    (bytes + 512) / 1024
}

/// Everything found by a scan of the cache root
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheScan {
    pub records: Vec<CacheFileRecord>,
    /// Files matching neither naming convention, listed unclassified
    pub unrecognized: Vec<PathBuf>,
}
