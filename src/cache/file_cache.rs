use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::ContentKey;
use crate::constants::TEMP_SUFFIX;
use crate::utils::{CacheError, Result};

/// File-level cache operations over a flat directory, one file per key
#[derive(Debug, Clone)]
pub struct FileCache {
    cache_dir: PathBuf,
}

impl FileCache {
    /// Create a file cache rooted at `cache_dir`. The directory is never
    /// created here; writes fail until it exists.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file path for a key
    pub fn path_for(&self, key: &ContentKey) -> PathBuf {
        self.cache_dir.join(key.as_str())
    }

    fn ensure_root(&self) -> Result<()> {
        if self.cache_dir.is_dir() {
            Ok(())
        } else {
            Err(CacheError::missing_root(&self.cache_dir))
        }
    }

    /// Load content for a key; `None` if nothing is cached
    pub fn load(&self, key: &ContentKey) -> Result<Option<Bytes>> {
        match fs::read(self.path_for(key)) {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write content for a key, replacing any existing file.
    ///
    /// The bytes go to a sibling temp file first and are renamed into
    /// place, so readers see either the old or the new content.
    pub fn store(&self, key: &ContentKey, content: &[u8]) -> Result<()> {
        self.ensure_root()?;

        let cache_path = self.path_for(key);
        let tmp_path = self.cache_dir.join(format!("{}{}", key, TEMP_SUFFIX));

        if let Err(e) = fs::write(&tmp_path, content) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp_path, &cache_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!("stored {} bytes at {}", content.len(), cache_path.display());
        Ok(())
    }

    /// Remove cache entry; absent entries are not an error
    pub fn remove(&self, key: &ContentKey) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Modification time of the cached file, if there is one
    pub fn modified(&self, key: &ContentKey) -> Result<Option<DateTime<Utc>>> {
        match fs::metadata(self.path_for(key)) {
            Ok(meta) => Ok(Some(DateTime::<Utc>::from(meta.modified()?))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
