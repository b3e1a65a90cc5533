//! Query time ranges
//!
//! Ranges are inclusive at both ends and carry wall-clock timestamps as the
//! stores record them (`yyyy-MM-dd HH:mm:ss`, no zone).

use chrono::{Duration, NaiveDate, NaiveDateTime};
use strata_query::DATETIME_FORMAT;

use crate::error::{Result, RouterError};

/// A time range for tier queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start of the range (inclusive)
    pub start: NaiveDateTime,
    /// End of the range (inclusive)
    pub end: NaiveDateTime,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if end < start {
            return Err(RouterError::param(format!(
                "start time {} is after end time {}",
                start.format(DATETIME_FORMAT),
                end.format(DATETIME_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `yyyy-MM-dd HH:mm:ss` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_datetime(start)?, parse_datetime(end)?)
    }

    /// Length of the range
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Calendar date of the start (partition lower bound)
    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Calendar date of the end (partition upper bound)
    pub fn end_date(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Parse a `yyyy-MM-dd HH:mm:ss` timestamp
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT).map_err(|_| {
        RouterError::param(format!(
            "invalid time format: {} (use yyyy-MM-dd HH:mm:ss)",
            s
        ))
    })
}
