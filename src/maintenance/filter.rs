use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

use super::types::{CacheFileKind, CacheFileRecord};
use crate::utils::Result;

/// Conjunctive predicate over cache records. Unset criteria pass everything.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub kinds: HashSet<CacheFileKind>,
    pub country: Option<String>,
    pub region: Option<String>,
    /// Keep records strictly larger than this many kilobytes
    pub above_kb: Option<u64>,
    /// Keep records strictly smaller than this many kilobytes
    pub below_kb: Option<u64>,
    /// Keep records at least this many days old
    pub min_age_days: Option<i64>,
    pub location: Option<Regex>,
    /// Flip the sense of the location test
    pub invert: bool,
}

impl FilterCriteria {
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = CacheFileKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn above_kb(mut self, kb: u64) -> Self {
        self.above_kb = Some(kb);
        self
    }

    pub fn below_kb(mut self, kb: u64) -> Self {
        self.below_kb = Some(kb);
        self
    }

    pub fn min_age_days(mut self, days: i64) -> Self {
        self.min_age_days = Some(days);
        self
    }

    /// Case-insensitive, unanchored match against the station name
    pub fn location(mut self, pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        self.location = Some(regex);
        Ok(self)
    }

    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    pub fn matches(&self, record: &CacheFileRecord) -> bool {
        if !self.kinds.is_empty() && !self.kinds.contains(&record.kind) {
            return false;
        }
        if !field_matches(self.country.as_deref(), record.country.as_deref()) {
            return false;
        }
        if !field_matches(self.region.as_deref(), record.region.as_deref()) {
            return false;
        }

        let size_kb = record.size_kb();
        if self.above_kb.is_some_and(|above| size_kb <= above) {
            return false;
        }
        if self.below_kb.is_some_and(|below| size_kb >= below) {
            return false;
        }
        if self.min_age_days.is_some_and(|age| record.age_days < age) {
            return false;
        }

        match &self.location {
            Some(pattern) => {
                let found = pattern.is_match(record.location.as_deref().unwrap_or_default());
                found != self.invert
            }
            None => true,
        }
    }
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
        (Some(_), None) => false,
    }
}

/// Records satisfying every set criterion
pub fn filter(
    records: impl IntoIterator<Item = CacheFileRecord>,
    criteria: &FilterCriteria,
) -> Vec<CacheFileRecord> {
    records
        .into_iter()
        .filter(|record| criteria.matches(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn record(id: &str, country: &str, kb: u64, age_days: i64, location: &str) -> CacheFileRecord {
        CacheFileRecord {
            id: id.to_string(),
            kind: CacheFileKind::Discardable,
            size_bytes: kb * 1024,
            modified: Utc::now(),
            age_days,
            path: PathBuf::from(format!("{}.dly", id)),
            country: Some(country.to_string()),
            region: None,
            location: Some(location.to_string()),
        }
    }

    fn sample() -> Vec<CacheFileRecord> {
        vec![
            record("A", "CA", 10, 5, "ALBERT HEAD"),
            record("B", "US", 20, 40, "BREWTON 3 SSE"),
            record("C", "CA", 30, 1, "VICTORIA INTL A"),
        ]
    }

    fn ids(criteria: &FilterCriteria) -> Vec<String> {
        filter(sample(), criteria).into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_no_criteria_passes_everything() {
        assert_eq!(ids(&FilterCriteria::default()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_conjunction() {
        assert_eq!(ids(&FilterCriteria::default().country("CA")), vec!["A", "C"]);
        assert_eq!(ids(&FilterCriteria::default().above_kb(15)), vec!["B", "C"]);
        assert_eq!(
            ids(&FilterCriteria::default().country("CA").below_kb(25)),
            vec!["A"]
        );
    }

    #[test]
    fn test_size_bounds_are_exclusive() {
        assert_eq!(ids(&FilterCriteria::default().above_kb(20)), vec!["C"]);
        assert_eq!(ids(&FilterCriteria::default().below_kb(20)), vec!["A"]);
    }

    #[test]
    fn test_min_age_is_inclusive() {
        assert_eq!(ids(&FilterCriteria::default().min_age_days(5)), vec!["A", "B"]);
    }

    #[test]
    fn test_location_pattern_and_invert() {
        let criteria = FilterCriteria::default().location("head|victoria").unwrap();
        assert_eq!(ids(&criteria), vec!["A", "C"]);
        assert_eq!(ids(&criteria.invert(true)), vec!["B"]);

        let substring = FilterCriteria::default().location("3 ss").unwrap();
        assert_eq!(ids(&substring), vec!["B"]);
    }

    #[test]
    fn test_bad_location_pattern() {
        assert!(FilterCriteria::default().location("(unclosed").is_err());
    }

    #[test]
    fn test_kinds_and_missing_fields() {
        let mut records = sample();
        records[1].kind = CacheFileKind::Active;
        records[2].country = None;

        let active = filter(records.clone(), &FilterCriteria::default().kinds([CacheFileKind::Active]));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "B");

        let canadian = filter(records, &FilterCriteria::default().country("ca"));
        assert_eq!(canadian.len(), 1);
        assert_eq!(canadian[0].id, "A");
    }
}
