//! CF-convention time coordinate decoding (`<unit> since <reference>`).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{NetCdfError, NetCdfResult};

/// Time unit of a CF time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hours),
            "d" | "day" | "days" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => 86400.0,
        }
    }
}

/// A parsed `units` attribute of a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl TimeUnits {
    /// Parse e.g. `hours since 2024-02-01 00:00:00`.
    pub fn parse(units: &str) -> NetCdfResult<Self> {
        let (unit, reference) = units
            .split_once(" since ")
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("time units '{}'", units)))?;

        let unit = TimeUnit::parse(unit)
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("time unit '{}'", unit)))?;

        Ok(Self {
            unit,
            reference: parse_reference(reference)?,
        })
    }

    /// Convert an offset in these units to a timestamp, rounded to the second.
    pub fn decode(&self, offset: f64) -> NetCdfResult<DateTime<Utc>> {
        if !offset.is_finite() {
            return Err(NetCdfError::InvalidFormat(format!(
                "non-finite time offset {}",
                offset
            )));
        }
        let seconds = (offset * self.unit.seconds()).round() as i64;
        Duration::try_seconds(seconds)
            .and_then(|d| self.reference.checked_add_signed(d))
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("time offset {} out of range", offset)))
    }
}

/// Decode a whole time coordinate.
pub fn decode_times(units: &str, offsets: &[f64]) -> NetCdfResult<Vec<DateTime<Utc>>> {
    let units = TimeUnits::parse(units)?;
    offsets.iter().map(|&o| units.decode(o)).collect()
}

fn parse_reference(s: &str) -> NetCdfResult<DateTime<Utc>> {
    let trimmed = s
        .trim()
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim_end_matches("+00:00")
        .trim();

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .ok_or_else(|| NetCdfError::InvalidFormat(format!("time reference '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_hours_since() {
        let times = decode_times("hours since 2024-02-01 00:00:00", &[0.0, 6.0, 30.0]).unwrap();
        assert_eq!(times, vec![utc(2024, 2, 1, 0), utc(2024, 2, 1, 6), utc(2024, 2, 2, 6)]);
    }

    #[test]
    fn test_days_since_date_only() {
        let times = decode_times("days since 1970-01-01", &[19754.0]).unwrap();
        assert_eq!(times, vec![utc(2024, 2, 1, 0)]);
    }

    #[test]
    fn test_reference_variants() {
        for units in [
            "seconds since 2024-02-01T00:00:00Z",
            "seconds since 2024-02-01 00:00:00 UTC",
            "seconds since 2024-02-01T00:00:00+00:00",
            "seconds since 2024-02-01 00:00",
        ] {
            let parsed = TimeUnits::parse(units).unwrap();
            assert_eq!(parsed.reference, utc(2024, 2, 1, 0), "units {}", units);
            assert_eq!(parsed.unit, TimeUnit::Seconds);
        }
    }

    #[test]
    fn test_fractional_offsets_round_to_second() {
        let units = TimeUnits::parse("days since 2024-02-01").unwrap();
        assert_eq!(units.decode(0.25).unwrap(), utc(2024, 2, 1, 6));
    }

    #[test]
    fn test_invalid_units() {
        assert!(TimeUnits::parse("hours").is_err());
        assert!(TimeUnits::parse("fortnights since 2024-02-01").is_err());
        assert!(TimeUnits::parse("hours since yesterday").is_err());
    }

    #[test]
    fn test_non_finite_offset() {
        let units = TimeUnits::parse("hours since 2024-02-01").unwrap();
        assert!(units.decode(f64::NAN).is_err());
    }
}
