use chrono::{DateTime, Datelike, Days, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use std::fmt;
use std::str::FromStr;

use crate::utils::CacheError;

/// When a cached copy must be checked against the origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FreshnessPolicy {
    /// Check the origin for changes whenever an entry exists
    Always,
    /// Serve only from the cache, never touch the network
    Never,
    /// Entries written since the start of the current calendar year are fresh
    Yearly,
    /// Entries written since local midnight `n` days ago are fresh
    WithinDays(u32),
}

impl FromStr for FreshnessPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let directive = s.trim();
        match directive.to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "yearly" => Ok(Self::Yearly),
            // Day counts past u32::MAX saturate; the cutoff is out of range either way
            digits if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self::WithinDays(digits.parse().unwrap_or(u32::MAX)))
            }
            _ => Err(CacheError::InvalidPolicy(s.to_string())),
        }
    }
}

impl From<u32> for FreshnessPolicy {
    fn from(days: u32) -> Self {
        Self::WithinDays(days)
    }
}

impl fmt::Display for FreshnessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Never => f.write_str("never"),
            Self::Yearly => f.write_str("yearly"),
            Self::WithinDays(n) => write!(f, "{}", n),
        }
    }
}

/// First instant of `date` in the zone `resolve` maps wall-clock times into.
///
/// Where a DST transition skips midnight, the day starts at 01:00 instead.
fn start_of_day<Tz, F>(date: NaiveDate, resolve: F) -> Option<DateTime<Tz>>
where
    Tz: TimeZone,
    F: Fn(&NaiveDateTime) -> LocalResult<DateTime<Tz>>,
{
    [0, 1]
        .into_iter()
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|naive| resolve(&naive).earliest())
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    start_of_day(date, |naive| Local.from_local_datetime(naive))
}

/// Local midnight on January 1st of `now`'s year
pub fn start_of_year(now: DateTime<Local>) -> DateTime<Local> {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(local_midnight)
        .unwrap_or(now)
}

/// Local midnight `days` days before `now`'s date.
///
/// `None` when the cutoff falls outside the representable range, in which
/// case nothing cached can be older than it.
pub fn days_before(now: DateTime<Local>, days: u32) -> Option<DateTime<Local>> {
    now.date_naive()
        .checked_sub_days(Days::new(u64::from(days)))
        .and_then(local_midnight)
}
