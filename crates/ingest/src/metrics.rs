//! Ingestion metrics
//!
//! Atomic counters for the pipeline. All operations use relaxed ordering;
//! values are eventually consistent, not real-time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Counters for the ingestion pipeline
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Readings offered to the pipeline
    received: AtomicU64,

    /// Readings admitted to the buffer
    accepted: AtomicU64,

    /// Readings refused by validation
    rejected: AtomicU64,

    /// Readings refused as already seen
    duplicates: AtomicU64,

    /// Batches handed to the writer
    batches_flushed: AtomicU64,

    /// Rows the hot store acknowledged
    rows_written: AtomicU64,

    /// Batches the hot store refused
    write_failures: AtomicU64,

    /// Batches lost to overflow or a failed dead-letter handoff
    batches_dropped: AtomicU64,

    /// Size of the most recent batch
    last_batch_size: AtomicU64,

    /// Latency of the most recent write in milliseconds
    last_write_ms: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            batches_flushed: AtomicU64::new(0),
            rows_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            last_batch_size: AtomicU64::new(0),
            last_write_ms: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_duplicate(&self) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch leaving the buffer
    #[inline]
    pub fn record_flush(&self, size: usize) {
        self.batches_flushed.fetch_add(1, Ordering::Relaxed);
        self.last_batch_size.store(size as u64, Ordering::Relaxed);
    }

    /// Record a successful write and its latency
    #[inline]
    pub fn record_written(&self, rows: u64, elapsed: Duration) {
        self.rows_written.fetch_add(rows, Ordering::Relaxed);
        self.last_write_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            batches_flushed: self.batches_flushed.load(Ordering::Relaxed),
            rows_written: self.rows_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            last_batch_size: self.last_batch_size.load(Ordering::Relaxed),
            last_write_ms: self.last_write_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of ingestion metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub batches_flushed: u64,
    pub rows_written: u64,
    pub write_failures: u64,
    pub batches_dropped: u64,
    pub last_batch_size: u64,
    pub last_write_ms: u64,
}
