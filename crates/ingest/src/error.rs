//! Ingestion error types

use std::time::Duration;

use thiserror::Error;

/// Why a reading was refused at the door
///
/// Rejections are terminal: the reading is dropped and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// Message was not valid JSON for a reading
    #[error("malformed reading: {0}")]
    Malformed(String),

    /// Required field absent or blank
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No metrics at all
    #[error("reading carries no metrics")]
    EmptyMetrics,

    /// Metric is null, NaN or infinite
    #[error("metric {metric} is not a finite number")]
    NonFinite { metric: String },

    /// Metric outside its plausibility range
    #[error("metric {metric} = {value} outside [{min}, {max}]")]
    OutOfRange {
        metric: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Timestamp in no accepted format
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl Rejection {
    /// Short label for logs and counters
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::Malformed(_) => "malformed",
            Rejection::MissingField(_) => "missing_field",
            Rejection::EmptyMetrics => "empty_metrics",
            Rejection::NonFinite { .. } => "non_finite",
            Rejection::OutOfRange { .. } => "out_of_range",
            Rejection::InvalidTimestamp(_) => "invalid_timestamp",
        }
    }
}

/// Hot-store write failure; covers the whole batch
#[derive(Debug, Error)]
pub enum WriteError {
    /// Store unreachable (network failure or timeout)
    #[error("hot store unavailable: {0}")]
    Unavailable(String),

    /// Store refused the insert
    #[error("write failed: {0}")]
    Failed(String),
}

impl WriteError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, WriteError::Unavailable(_))
    }
}

impl From<clickhouse::error::Error> for WriteError {
    fn from(err: clickhouse::error::Error) -> Self {
        match err {
            clickhouse::error::Error::Network(_) | clickhouse::error::Error::TimedOut => {
                WriteError::Unavailable(err.to_string())
            }
            other => WriteError::Failed(other.to_string()),
        }
    }
}

/// Pipeline lifecycle errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// In-flight writes outlived the shutdown deadline
    #[error("shutdown timed out after {timeout:?} with {pending} writes in flight")]
    ShutdownTimeout { timeout: Duration, pending: usize },
}
