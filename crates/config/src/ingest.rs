//! Ingestion pipeline configuration
//!
//! Batching, deduplication, backpressure and failed-batch handling for
//! readings headed to the hot store.
//!
//! # Defaults
//!
//! - `batch_size`: 100 readings
//! - `flush_interval`: 5s
//! - `dedup_capacity`: 100000 ids
//! - `max_pending_batches`: 4 in-flight writes
//! - `overflow`: block
//! - `failure_policy`: drop

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

/// What to do with a flushed batch when the pending-write queue is full
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Hold admission until a write slot frees up (default)
    #[default]
    Block,
    /// Hand the batch to the failure policy immediately
    Drop,
}

/// What to do with a batch the hot store refused
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log and count (default)
    #[default]
    Drop,
    /// Append the batch to the dead-letter file
    DeadLetter,
}

/// Inclusive plausibility range for one metric
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct MetricRange {
    /// Lowest accepted value
    pub min: f64,
    /// Highest accepted value
    pub max: f64,
}

impl MetricRange {
    /// Create a range
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Physical plausibility ranges for the stock sensor metrics
pub fn default_limits() -> BTreeMap<String, MetricRange> {
    BTreeMap::from([
        ("temperature".to_string(), MetricRange::new(-50.0, 150.0)),
        ("humidity".to_string(), MetricRange::new(0.0, 100.0)),
        ("pressure".to_string(), MetricRange::new(500.0, 1500.0)),
    ])
}

/// Ingestion configuration
///
/// # Example
///
/// ```toml
/// [ingest]
/// batch_size = 500
/// flush_interval = "2s"
/// overflow = "drop"
/// failure_policy = "dead_letter"
/// dead_letter_path = "/var/lib/strata/failed.jsonl"
///
/// [ingest.limits.temperature]
/// min = -40.0
/// max = 125.0
/// ```
///
/// Specifying `[ingest.limits]` replaces the default ranges entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Readings per batch before a size-triggered flush
    pub batch_size: usize,

    /// Timer flush period
    #[serde(with = "humantime_serde")]
    pub flush_interval: Duration,

    /// Maximum ids held by the duplicate filter
    pub dedup_capacity: usize,

    /// Flushed batches allowed to be in flight at once
    pub max_pending_batches: usize,

    /// Behavior when `max_pending_batches` is reached
    pub overflow: OverflowPolicy,

    /// How long shutdown waits for in-flight writes
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Disposition of batches the hot store refused
    pub failure_policy: FailurePolicy,

    /// JSON-lines file receiving failed batches (dead_letter policy)
    pub dead_letter_path: String,

    /// Failed batches buffered before the dead-letter writer applies backpressure
    pub dead_letter_capacity: usize,

    /// Per-metric plausibility ranges
    pub limits: BTreeMap<String, MetricRange>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
            dedup_capacity: 100_000,
            max_pending_batches: 4,
            overflow: OverflowPolicy::Block,
            shutdown_timeout: Duration::from_secs(30),
            failure_policy: FailurePolicy::Drop,
            dead_letter_path: "dead_letter.jsonl".into(),
            dead_letter_capacity: 1000,
            limits: default_limits(),
        }
    }
}
