//! Tests for time range parsing

use chrono::{Duration, NaiveDate};

use crate::timerange::{TimeRange, parse_datetime};

#[test]
fn test_parse_range() {
    let range = TimeRange::parse("2024-03-01 10:00:00", "2024-03-01 10:05:00").unwrap();
    assert_eq!(range.duration(), Duration::minutes(5));
}

#[test]
fn test_parse_trims_whitespace() {
    let range = TimeRange::parse(" 2024-03-01 00:00:00", "2024-03-02 00:00:00 ").unwrap();
    assert_eq!(range.duration(), Duration::hours(24));
}

#[test]
fn test_zero_length_range_allowed() {
    let range = TimeRange::parse("2024-03-01 10:00:00", "2024-03-01 10:00:00").unwrap();
    assert_eq!(range.duration(), Duration::zero());
}

#[test]
fn test_inverted_range_rejected() {
    let err = TimeRange::parse("2024-03-02 00:00:00", "2024-03-01 00:00:00").unwrap_err();
    assert!(err.is_client_error());
    assert!(err.to_string().contains("after end time"));
}

#[test]
fn test_invalid_format_rejected() {
    assert!(parse_datetime("2024-03-01").is_err());
    assert!(parse_datetime("2024-03-01T10:00:00").is_err());
    assert!(parse_datetime("yesterday").is_err());
    assert!(parse_datetime("2024-13-01 00:00:00").is_err());
}

#[test]
fn test_date_bounds() {
    let range = TimeRange::parse("2024-02-28 23:00:00", "2024-03-01 01:00:00").unwrap();
    assert_eq!(range.start_date(), NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
    assert_eq!(range.end_date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
}
