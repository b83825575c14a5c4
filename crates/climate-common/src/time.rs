//! Time handling utilities for catalog queries and forecast data.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used by search datetime ranges and coverage time axes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Layout of the `issue_date` month bucket property.
pub const MONTH_BUCKET_FORMAT: &str = "%Y%m";

/// Days added per step when walking month buckets.
const MONTH_STEP_DAYS: i64 = 32;

/// A closed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }

    /// Month buckets covered by this range. See [`month_buckets`].
    pub fn month_buckets(&self) -> Vec<String> {
        month_buckets(self.start, self.end)
    }
}

/// Parse a `start/end` search range where both ends use [`TIMESTAMP_FORMAT`].
pub fn parse_datetime_range(s: &str) -> Result<TimeRange, TimeParseError> {
    let (start, end) = s
        .split_once('/')
        .ok_or_else(|| TimeParseError::MissingSeparator(s.to_string()))?;

    Ok(TimeRange::new(parse_timestamp(start)?, parse_timestamp(end)?))
}

/// Parse a single `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}

/// Format a timestamp the way coverage time axes carry it.
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Enumerate `YYYYMM` buckets between `start` and `end`, inclusive.
///
/// Starts at `start` itself, then repeatedly adds 32 days and resets the day
/// to the 1st, keeping the time of day. A start late in a month can overshoot
/// a short following month (e.g. Jan 31 + 32 days lands in March), so that
/// month is skipped. Callers depend on this exact stepping.
pub fn month_buckets(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
    let mut buckets = Vec::new();
    let mut current = start;

    while current <= end {
        buckets.push(current.format(MONTH_BUCKET_FORMAT).to_string());

        let advanced = current + Duration::days(MONTH_STEP_DAYS);
        current = advanced.with_day(1).unwrap_or(advanced);
    }

    buckets
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}. Expected YYYY-MM-DDTHH:MM:SSZ")]
    InvalidFormat(String),

    #[error("Invalid datetime range '{0}': expected 'start/end'")]
    MissingSeparator(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp() {
        let dt = parse_timestamp("2024-02-01T06:30:00Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 6);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_rejects_offsets() {
        assert!(parse_timestamp("2024-02-01T00:00:00+01:00").is_err());
        assert!(parse_timestamp("2024-02-01").is_err());
    }

    #[test]
    fn test_parse_range_requires_separator() {
        let err = parse_datetime_range("2024-02-01T00:00:00Z").unwrap_err();
        assert!(matches!(err, TimeParseError::MissingSeparator(_)));
    }

    #[test]
    fn test_single_month_range() {
        let range =
            parse_datetime_range("2024-02-01T00:00:00Z/2024-02-29T00:00:00Z").unwrap();
        assert_eq!(range.month_buckets(), vec!["202402".to_string()]);
    }

    #[test]
    fn test_buckets_cross_year_boundary() {
        let range =
            parse_datetime_range("2023-11-01T00:00:00Z/2024-02-01T00:00:00Z").unwrap();
        assert_eq!(
            range.month_buckets(),
            vec!["202311", "202312", "202401", "202402"]
        );
    }

    #[test]
    fn test_late_start_skips_short_month() {
        // Jan 31 + 32 days = Mar 3, truncated to Mar 1: February is never visited.
        let range =
            parse_datetime_range("2024-01-31T00:00:00Z/2024-03-15T00:00:00Z").unwrap();
        assert_eq!(range.month_buckets(), vec!["202401", "202403"]);
    }

    #[test]
    fn test_end_before_start_is_empty() {
        let range =
            parse_datetime_range("2024-03-01T00:00:00Z/2024-02-01T00:00:00Z").unwrap();
        assert!(range.month_buckets().is_empty());
    }

    #[test]
    fn test_time_of_day_is_kept_between_steps() {
        // The second step lands on 2024-03-01T12:00, which is after the end.
        let range =
            parse_datetime_range("2024-02-10T12:00:00Z/2024-03-01T06:00:00Z").unwrap();
        assert_eq!(range.month_buckets(), vec!["202402"]);
    }
}
