use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the cache core
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Origin unavailable for {uri}: {reason}")]
    OriginUnavailable { uri: String, reason: String },

    #[error("Invalid freshness policy: {0:?} (expected always, never, yearly or a day count)")]
    InvalidPolicy(String),

    #[error("Invalid location pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CacheError {
    /// Cache root is not an existing directory
    pub fn missing_root(root: &std::path::Path) -> Self {
        Self::ConfigError(format!(
            "cache directory {} does not exist",
            root.display()
        ))
    }
}

/// A single file that could not be deleted during maintenance
#[derive(Error, Debug)]
#[error("failed to remove {}: {source}", .path.display())]
pub struct RemovalError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub type Result<T> = std::result::Result<T, CacheError>;
