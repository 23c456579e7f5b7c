use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::scanner::recognize;
use super::types::{kilobytes, CacheFileRecord};
use crate::utils::{CacheError, RemovalError, Result};

/// Included records, sorted by id, with their combined size
#[derive(Debug, Clone, Serialize)]
pub struct CacheReport {
    pub entries: Vec<CacheFileRecord>,
    pub total_size_kb: u64,
}

impl CacheReport {
    pub fn new(mut entries: Vec<CacheFileRecord>) -> Self {
        entries.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.path.cmp(&b.path)));
        let total_bytes = entries.iter().map(|r| r.size_bytes).sum();
        Self {
            entries,
            total_size_kb: kilobytes(total_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Delete each record's file, carrying on past failures
pub fn remove(records: &[CacheFileRecord]) -> Vec<RemovalError> {
    let mut errors = Vec::new();
    for record in records {
        if let Err(e) = remove_one(&record.path) {
            warn!("{}", e);
            errors.push(e);
        }
    }
    info!("removed {} of {} cache files", records.len() - errors.len(), records.len());
    errors
}

/// Delete every data and catalog file under `cache_root`, leaving other
/// files alone. Returns one error per file that could not be removed.
pub fn clean(cache_root: &Path) -> Result<Vec<RemovalError>> {
    if !cache_root.is_dir() {
        return Err(CacheError::missing_root(cache_root));
    }

    let mut errors = Vec::new();
    let mut removed = 0usize;
    for entry in fs::read_dir(cache_root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                errors.push(RemovalError {
                    path: cache_root.to_path_buf(),
                    source,
                });
                continue;
            }
        };

        let file_name = entry.file_name();
        if file_name.to_str().and_then(recognize).is_none() {
            continue;
        }

        match remove_one(&entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!("{}", e);
                errors.push(e);
            }
        }
    }

    info!("cleaned {} files from {} ({} failed)", removed, cache_root.display(), errors.len());
    Ok(errors)
}

fn remove_one(path: &Path) -> std::result::Result<(), RemovalError> {
    debug!("removing {}", path.display());
    fs::remove_file(path).map_err(|source| RemovalError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maintenance::CacheFileKind;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(dir: &Path, id: &str, size_bytes: u64) -> CacheFileRecord {
        CacheFileRecord {
            id: id.to_string(),
            kind: CacheFileKind::Discardable,
            size_bytes,
            modified: Utc::now(),
            age_days: 0,
            path: dir.join(format!("{}.dly", id)),
            country: None,
            region: None,
            location: None,
        }
    }

    #[test]
    fn test_report_sorts_and_totals() {
        let dir = Path::new("/cache");
        let report = CacheReport::new(vec![
            record(dir, "USC00011084", 3000),
            record(dir, "CA001015105", 1000),
            record(dir, "AQW00061705", 2000),
        ]);

        let ids: Vec<_> = report.entries.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["AQW00061705", "CA001015105", "USC00011084"]);
        assert_eq!(report.total_size_kb, 6);
        assert_eq!(report.len(), 3);
        assert!(CacheReport::new(Vec::new()).is_empty());
    }

    #[test]
    fn test_remove_continues_past_failures() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("A.dly"), "a").unwrap();
        fs::write(root.join("C.dly"), "c").unwrap();

        let records = vec![record(root, "A", 1), record(root, "B", 1), record(root, "C", 1)];
        let errors = remove(&records);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, root.join("B.dly"));
        assert!(!root.join("A.dly").exists());
        assert!(!root.join("C.dly").exists());
    }

    #[test]
    fn test_clean_is_best_effort() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["USC00000001.dly", "USC00000002.dly", "ghcnd-stations.txt", "ghcnd-countries.txt"] {
            fs::write(root.join(name), "x").unwrap();
        }
        // A directory under a data-file name cannot be removed as a file
        fs::create_dir(root.join("USC00000003.dly")).unwrap();
        fs::write(root.join("notes.md"), "keep").unwrap();
        fs::write(root.join("USC00000001.dly.tmp"), "keep").unwrap();

        let errors = clean(root).unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, root.join("USC00000003.dly"));
        assert!(errors[0].to_string().contains("USC00000003.dly"));

        let mut left: Vec<_> = fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        left.sort();
        assert_eq!(left, vec!["USC00000001.dly.tmp", "USC00000003.dly", "notes.md"]);
    }

    #[test]
    fn test_clean_empty_and_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(clean(temp_dir.path()).unwrap().is_empty());
        assert!(matches!(
            clean(&temp_dir.path().join("missing")),
            Err(CacheError::ConfigError(_))
        ));
    }
}
