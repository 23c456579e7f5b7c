use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{CacheFileKind, CacheFileRecord, CacheScan};
use crate::constants::STATIONS_CATALOG;
use crate::stations::{country_of, StationCatalog};
use crate::utils::{CacheError, Clock, Result};

static DATA_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<id>[A-Za-z0-9]+)\.dly$").expect("data file pattern is valid")
});

static CATALOG_FILE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^ghcnd-(?P<id>[A-Za-z0-9_-]+)\.txt$").expect("catalog file pattern is valid")
});

/// Naming convention a cache filename follows, with the id it carries
pub(crate) fn recognize(file_name: &str) -> Option<(CacheFileKind, &str)> {
    if let Some(caps) = DATA_FILE.captures(file_name) {
        return caps.name("id").map(|m| (CacheFileKind::Discardable, m.as_str()));
    }
    CATALOG_FILE
        .captures(file_name)
        .and_then(|caps| caps.name("id"))
        .map(|m| (CacheFileKind::Catalog, m.as_str()))
}

/// Scan `cache_root` and classify every regular file in it.
///
/// Data files whose id is in `protected_ids` are `Active`, other data
/// files `Discardable`. When the station catalog is cached it is used to
/// fill region and location.
pub fn classify(
    cache_root: &Path,
    protected_ids: &HashSet<String>,
    clock: &dyn Clock,
) -> Result<CacheScan> {
    if !cache_root.is_dir() {
        return Err(CacheError::missing_root(cache_root));
    }

    let catalog = load_catalog(cache_root);
    let now: DateTime<Utc> = clock.now().into();
    let mut scan = CacheScan::default();

    for entry in fs::read_dir(cache_root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry in {}: {}", cache_root.display(), e);
                continue;
            }
        };
        // Follows symlinks, so a dangling link is skipped here
        let metadata = match fs::metadata(entry.path()) {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                warn!("skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let file_name = entry.file_name();
        let Some((kind, id)) = file_name.to_str().and_then(recognize) else {
            scan.unrecognized.push(entry.path());
            continue;
        };

        let modified: DateTime<Utc> = match metadata.modified() {
            Ok(time) => time.into(),
            Err(e) => {
                warn!("skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let mut record = CacheFileRecord {
            id: id.to_string(),
            kind,
            size_bytes: metadata.len(),
            modified,
            age_days: (now - modified).num_days(),
            path: entry.path(),
            country: None,
            region: None,
            location: None,
        };

        if kind == CacheFileKind::Discardable {
            if protected_ids.contains(id) {
                record.kind = CacheFileKind::Active;
            }
            record.country = country_of(id).map(str::to_string);
            if let Some(station) = catalog.as_ref().and_then(|c| c.get(id)) {
                record.region = station.state.clone();
                record.location = Some(station.name.clone()).filter(|n| !n.is_empty());
            }
        }

        scan.records.push(record);
    }

    scan.unrecognized.sort();
    debug!(
        "classified {} cache files ({} unrecognized) in {}",
        scan.records.len(),
        scan.unrecognized.len(),
        cache_root.display()
    );
    Ok(scan)
}

fn load_catalog(cache_root: &Path) -> Option<StationCatalog> {
    let path = cache_root.join(STATIONS_CATALOG);
    if !path.is_file() {
        return None;
    }
    match StationCatalog::load(&path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("ignoring unreadable station catalog {}: {}", path.display(), e);
            None
        }
    }
}
