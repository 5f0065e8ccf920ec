//! Date and time normalization
//!
//! Events accept free-form dates and clock times but always store them as
//! `YYYY-MM-DD` and `HH:MM`. Dates are anchored to UTC: an instant with an
//! explicit offset is converted to UTC before its calendar day is taken, and
//! an input without an offset is read as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::error::{ValidationError, ValidationErrorKind, ValidationResult};

static TIME_REGEX: OnceLock<Regex> = OnceLock::new();

/// Date-times carrying a numeric offset that RFC 3339 rejects (e.g. `-0500`)
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%z",
];

/// Date-times without an offset
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar dates without a time of day
const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%a %b %d %Y",
    "%A, %B %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

fn time_regex() -> &'static Regex {
    TIME_REGEX.get_or_init(|| {
        Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])(?::[0-5][0-9])?$")
            .expect("Invalid time regex pattern")
    })
}

/// Normalize a clock time to 24-hour `HH:MM`
///
/// Accepts `HH:MM` or `HH:MM:SS` (seconds are dropped) with surrounding
/// whitespace. Single-digit hours or minutes are rejected.
pub fn normalize_time(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();

    time_regex()
        .captures(trimmed)
        .map(|caps| format!("{}:{}", &caps[1], &caps[2]))
        .ok_or_else(|| {
            ValidationError::with_context(
                ValidationErrorKind::InvalidFormat,
                "time",
                format!("Expected HH:MM or HH:MM:SS, got '{}'", trimmed),
            )
        })
}

/// Normalize a free-form date or date-time to its UTC calendar day
///
/// Only years `0000` through `9999` are accepted, since anything else has
/// no four-digit `YYYY-MM-DD` rendering.
pub fn normalize_date(input: &str) -> ValidationResult<String> {
    let trimmed = input.trim();

    parse_instant(trimmed)
        .filter(|instant| (0..=9999).contains(&instant.year()))
        .map(|instant| instant.format("%Y-%m-%d").to_string())
        .ok_or_else(|| {
            ValidationError::with_context(
                ValidationErrorKind::InvalidFormat,
                "date",
                format!("Unrecognized date '{}'", trimmed),
            )
        })
}

/// Parse a date or date-time string into a UTC instant
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc));
    if with_offset.is_some() {
        return with_offset;
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok());
    if let Some(naive) = naive {
        return Some(naive.and_utc());
    }

    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_time_valid() {
        assert_eq!(normalize_time("09:05").unwrap(), "09:05");
        assert_eq!(normalize_time("09:05:30").unwrap(), "09:05");
        assert_eq!(normalize_time("  23:59:59 ").unwrap(), "23:59");
        assert_eq!(normalize_time("00:00").unwrap(), "00:00");
    }

    #[test]
    fn test_normalize_time_invalid() {
        let invalid = ["9:5", "9:05", "24:00", "12:60", "12:30:60", "noon", "", "12:30 PM"];

        for input in invalid {
            let err = normalize_time(input).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{}", input);
            assert_eq!(err.field, "time");
        }
    }

    #[test]
    fn test_normalize_date_utc_rollover() {
        assert_eq!(
            normalize_date("2024-03-01T23:00:00-05:00").unwrap(),
            "2024-03-02"
        );
        assert_eq!(
            normalize_date("2024-03-02T01:30:00+09:00").unwrap(),
            "2024-03-01"
        );
    }

    #[test]
    fn test_normalize_date_formats() {
        let cases = [
            ("2024-03-01", "2024-03-01"),
            ("  2024-03-01  ", "2024-03-01"),
            ("2024-03-01T10:00:00Z", "2024-03-01"),
            ("2024-03-01T10:00:00.250Z", "2024-03-01"),
            ("2024-03-01T23:00:00-0500", "2024-03-02"),
            ("2024-03-01T18:30", "2024-03-01"),
            ("2024-03-01 18:30:00", "2024-03-01"),
            ("Fri, 01 Mar 2024 23:00:00 -0500", "2024-03-02"),
            ("03/01/2024", "2024-03-01"),
            ("March 1, 2024", "2024-03-01"),
            ("Mar 1, 2024", "2024-03-01"),
            ("1 March 2024", "2024-03-01"),
            ("March 1 2024", "2024-03-01"),
            ("Mar 01 2024", "2024-03-01"),
            ("Fri Mar 01 2024", "2024-03-01"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize_date(input).unwrap(), expected, "{}", input);
        }
    }

    #[test]
    fn test_normalize_date_invalid() {
        for input in ["not-a-date", "", "   ", "2024-13-01", "2024-02-30", "tomorrow"] {
            let err = normalize_date(input).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{}", input);
            assert_eq!(err.field, "date");
        }
    }

    #[test]
    fn test_normalize_date_rejects_years_outside_four_digits() {
        for input in ["+12345-01-01", "-0001-01-01", "+12345-01-01T00:00:00Z"] {
            let err = normalize_date(input).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidFormat, "{}", input);
            assert_eq!(err.field, "date");
        }

        assert_eq!(normalize_date("0001-01-01").unwrap(), "0001-01-01");
        assert_eq!(normalize_date("9999-12-31").unwrap(), "9999-12-31");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let date = normalize_date("2024-03-01T23:00:00-05:00").unwrap();
        assert_eq!(normalize_date(&date).unwrap(), date);

        let time = normalize_time("18:45:12").unwrap();
        assert_eq!(normalize_time(&time).unwrap(), time);
    }
}
