use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::utils::Result;

/// One row of `ghcnd-stations.txt`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationInfo {
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub state: Option<String>,
    pub name: String,
}

impl StationInfo {
    /// FIPS country code, the first two characters of the station id
    pub fn country(&self) -> Option<&str> {
        country_of(&self.id)
    }
}

/// Country code embedded in a station id
pub fn country_of(station_id: &str) -> Option<&str> {
    station_id.get(..2).filter(|code| code.chars().all(|c| c.is_ascii_alphabetic()))
}

/// Fixed-width columns are 1-based and inclusive in the archive readme
fn column(line: &str, first: usize, last: usize) -> Option<&str> {
    let end = last.min(line.len());
    line.get(first - 1..end)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Station catalog keyed by station id
#[derive(Debug, Clone, Default)]
pub struct StationCatalog {
    stations: HashMap<String, StationInfo>,
}

impl StationCatalog {
    /// Parse catalog text; lines without an id are skipped
    pub fn parse(text: &str) -> Self {
        let stations = text
            .lines()
            .filter_map(|line| {
                let id = column(line, 1, 11)?.to_string();
                Some(StationInfo {
                    latitude: column(line, 13, 20).and_then(|v| v.parse().ok()),
                    longitude: column(line, 22, 30).and_then(|v| v.parse().ok()),
                    elevation: column(line, 32, 37).and_then(|v| v.parse().ok()),
                    state: column(line, 39, 40).map(str::to_string),
                    name: column(line, 42, 71).unwrap_or_default().to_string(),
                    id,
                })
            })
            .map(|s| (s.id.clone(), s))
            .collect();
        Self { stations }
    }

    /// Load and parse a catalog file. Non-UTF-8 bytes are replaced.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)?;
        let catalog = Self::parse(&String::from_utf8_lossy(&raw));
        debug!("loaded {} stations from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&StationInfo> {
        self.stations.get(id)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
ACW00011604  17.1167  -61.7833   10.1    ST JOHNS COOLIDGE FLD                       
CA001015105  48.3667 -123.5667   17.0 BC ALBERT HEAD                                 
USC00011084  31.0581  -87.0547   78.0 AL BREWTON 3 SSE                      HCN      
";

    #[test]
    fn test_parse_fixed_width() {
        let catalog = StationCatalog::parse(SAMPLE);
        assert_eq!(catalog.len(), 3);

        assert_eq!(
            catalog.get("CA001015105").unwrap(),
            &StationInfo {
                id: "CA001015105".to_string(),
                latitude: Some(48.3667),
                longitude: Some(-123.5667),
                elevation: Some(17.0),
                state: Some("BC".to_string()),
                name: "ALBERT HEAD".to_string(),
            }
        );

        let antigua = catalog.get("ACW00011604").unwrap();
        assert_eq!(antigua.state, None);
        assert_eq!(antigua.name, "ST JOHNS COOLIDGE FLD");
        assert_eq!(antigua.country(), Some("AC"));

        assert_eq!(catalog.get("USC00011084").unwrap().name, "BREWTON 3 SSE");
    }

    #[test]
    fn test_short_and_blank_lines() {
        let catalog = StationCatalog::parse("\n   \nUSW00094728\n");
        assert_eq!(catalog.len(), 1);
        let station = catalog.get("USW00094728").unwrap();
        assert_eq!(station.latitude, None);
        assert_eq!(station.name, "");
    }

    #[test]
    fn test_country_of() {
        assert_eq!(country_of("USC00011084"), Some("US"));
        assert_eq!(country_of("U"), None);
        assert_eq!(country_of("12345"), None);
    }
}
