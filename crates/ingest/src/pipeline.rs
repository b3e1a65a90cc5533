//! Ingestion pipeline
//!
//! Wires validation, deduplication, buffering and the batch writer:
//!
//! ```text
//! raw ─▶ validate ─▶ dedup ─▶ buffer ──(size / timer / manual)──▶ writer
//!          │           │                                        │
//!       Rejected   Duplicate                         failure policy (drop | dead letter)
//! ```
//!
//! Writes run on spawned tasks and may finish out of order. At most
//! `max_pending_batches` writes are in flight; beyond that the overflow
//! policy decides between waiting and failing the batch.
//!
//! A batch is tracked from before it leaves the buffer until its write (or
//! failure handoff) ends, so shutdown cannot miss a batch that is waiting
//! for a write slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use strata_config::{IngestConfig, OverflowPolicy};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tracing::{debug, error, info, trace, warn};

use crate::buffer::{Admission, IngestBuffer, PendingBatch};
use crate::dedup::DuplicateFilter;
use crate::error::{IngestError, Rejection, WriteError};
use crate::metrics::{IngestMetrics, MetricsSnapshot};
use crate::reading::{RawReading, SensorReading};
use crate::validator::ReadingValidator;
use crate::writer::BatchWriter;

// =============================================================================
// Outcomes
// =============================================================================

/// Result of offering one reading
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Buffered for the next flush (written at once by `ingest_now`)
    Accepted,
    /// Id seen recently; dropped
    Duplicate,
    /// Failed validation; dropped
    Rejected(Rejection),
    /// Pipeline is shutting down
    Closed,
}

/// Why a batch never reached the hot store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    /// Store unreachable
    Unavailable(String),
    /// Store refused the insert
    Failed(String),
    /// Pending-write limit reached under the drop overflow policy
    Overflow,
}

impl From<WriteError> for FailureReason {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Unavailable(msg) => FailureReason::Unavailable(msg),
            WriteError::Failed(msg) => FailureReason::Failed(msg),
        }
    }
}

/// A batch handed to the failure policy
#[derive(Debug, Clone, Serialize)]
pub struct FailedBatch {
    pub reason: FailureReason,
    pub readings: Vec<SensorReading>,
}

/// Where failed batches go
#[derive(Debug, Clone, Default)]
pub enum FailedBatchSink {
    /// Log and count
    #[default]
    Drop,
    /// Send to a bounded dead-letter channel
    DeadLetter(mpsc::Sender<FailedBatch>),
}

/// What shutdown drained
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DrainReport {
    /// Readings left in the buffer at shutdown
    pub flushed: usize,
    pub metrics: MetricsSnapshot,
}

/// Live pipeline state
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProcessingStats {
    pub buffered: usize,
    pub running: bool,
    pub batch_size: usize,
    pub flush_interval_ms: u64,
    pub pending_writes: usize,
    pub metrics: MetricsSnapshot,
}

// =============================================================================
// Pipeline
// =============================================================================

struct Inner {
    validator: ReadingValidator,
    dedup: DuplicateFilter,
    buffer: IngestBuffer,
    writer: Arc<dyn BatchWriter>,
    failures: FailedBatchSink,
    metrics: IngestMetrics,
    permits: Arc<Semaphore>,
    overflow: OverflowPolicy,
    flush_interval: Duration,
    tracker: TaskTracker,
    accepting: AtomicBool,
}

/// Validates, deduplicates and batches readings into the hot store
///
/// Cheap to clone; clones share the same buffer and counters.
#[derive(Clone)]
pub struct IngestPipeline {
    inner: Arc<Inner>,
}

impl IngestPipeline {
    pub fn new(
        config: &IngestConfig,
        validator: ReadingValidator,
        dedup: DuplicateFilter,
        writer: Arc<dyn BatchWriter>,
        failures: FailedBatchSink,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                validator,
                dedup,
                buffer: IngestBuffer::new(config.batch_size),
                writer,
                failures,
                metrics: IngestMetrics::new(),
                permits: Arc::new(Semaphore::new(config.max_pending_batches.max(1))),
                overflow: config.overflow,
                flush_interval: config.flush_interval,
                tracker: TaskTracker::new(),
                accepting: AtomicBool::new(true),
            }),
        }
    }

    /// Offer one reading
    ///
    /// Under the block overflow policy this waits while the pending-write
    /// limit is reached.
    pub async fn ingest(&self, raw: RawReading) -> IngestOutcome {
        if !self.is_running() {
            return IngestOutcome::Closed;
        }
        self.inner.metrics.record_received();

        let reading = match self.inner.validator.validate(raw) {
            Ok(reading) => reading,
            Err(rejection) => return self.reject(rejection),
        };

        self.admit(reading).await
    }

    /// Parse one JSON message and offer it
    pub async fn ingest_json(&self, line: &str) -> IngestOutcome {
        if !self.is_running() {
            return IngestOutcome::Closed;
        }

        match serde_json::from_str::<RawReading>(line) {
            Ok(raw) => self.ingest(raw).await,
            Err(e) => {
                self.inner.metrics.record_received();
                self.reject(Rejection::Malformed(e.to_string()))
            }
        }
    }

    fn reject(&self, rejection: Rejection) -> IngestOutcome {
        self.inner.metrics.record_rejected();
        debug!(reason = rejection.kind(), error = %rejection, "reading rejected");
        IngestOutcome::Rejected(rejection)
    }

    fn is_duplicate(&self, reading: &SensorReading) -> bool {
        if self.inner.dedup.is_duplicate(&reading.data_id) {
            self.inner.metrics.record_duplicate();
            debug!(data_id = %reading.data_id, "duplicate reading");
            return true;
        }
        false
    }

    async fn admit(&self, reading: SensorReading) -> IngestOutcome {
        if self.is_duplicate(&reading) {
            return IngestOutcome::Duplicate;
        }

        trace!(data_id = %reading.data_id, robot_id = %reading.robot_id, "admitting reading");

        let token = self.inner.tracker.token();
        let batch = match self.inner.buffer.admit(reading) {
            Admission::Buffered => None,
            Admission::Full(batch) => Some(batch),
            Admission::Closed => return IngestOutcome::Closed,
        };

        self.inner.metrics.record_accepted();
        if let Some(batch) = batch {
            self.dispatch(batch, token).await;
        }
        IngestOutcome::Accepted
    }

    /// Validate one reading and write it straight to the store
    ///
    /// Bypasses the buffer. Duplicates and rejections are reported without a
    /// write; a failed write is returned to the caller instead of going to
    /// the failure policy.
    pub async fn ingest_now(&self, raw: RawReading) -> Result<IngestOutcome, WriteError> {
        if !self.is_running() {
            return Ok(IngestOutcome::Closed);
        }
        self.inner.metrics.record_received();

        let reading = match self.inner.validator.validate(raw) {
            Ok(reading) => reading,
            Err(rejection) => return Ok(self.reject(rejection)),
        };
        if self.is_duplicate(&reading) {
            return Ok(IngestOutcome::Duplicate);
        }

        // taken before the closed check so a concurrent shutdown waits for us
        let _token = self.inner.tracker.token();
        if self.inner.buffer.is_closed() {
            return Ok(IngestOutcome::Closed);
        }
        self.inner.metrics.record_accepted();

        let start = Instant::now();
        match self.inner.writer.write(std::slice::from_ref(&reading)).await {
            Ok(rows) => {
                self.inner.metrics.record_written(rows, start.elapsed());
                debug!(data_id = %reading.data_id, writer = self.inner.writer.name(), "reading written");
                Ok(IngestOutcome::Accepted)
            }
            Err(e) => {
                self.inner.metrics.record_write_failure();
                warn!(data_id = %reading.data_id, error = %e, "direct write failed");
                Err(e)
            }
        }
    }

    /// Flush whatever is buffered; returns readings dispatched
    pub async fn flush(&self) -> usize {
        let token = self.inner.tracker.token();
        match self.inner.buffer.take() {
            Some(batch) => {
                let count = batch.len();
                self.dispatch(batch, token).await;
                count
            }
            None => 0,
        }
    }

    /// Hand a batch to a write task, honoring the pending limit
    ///
    /// `token` keeps the batch visible to shutdown until the write ends.
    async fn dispatch(&self, batch: PendingBatch, token: TaskTrackerToken) {
        let size = batch.len();
        self.inner.metrics.record_flush(size);
        debug!(
            size,
            age_ms = batch.age().as_millis() as u64,
            "dispatching batch"
        );

        let permit = match self.acquire_permit().await {
            Some(permit) => permit,
            None => {
                warn!(size, "pending write limit reached, failing batch");
                self.inner
                    .fail(batch.readings, FailureReason::Overflow)
                    .await;
                return;
            }
        };

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let _token = token;
            let _permit = permit;
            inner.write(batch.readings).await;
        });
    }

    async fn acquire_permit(&self) -> Option<OwnedSemaphorePermit> {
        let permits = Arc::clone(&self.inner.permits);
        match self.inner.overflow {
            OverflowPolicy::Block => permits.acquire_owned().await.ok(),
            OverflowPolicy::Drop => permits.try_acquire_owned().ok(),
        }
    }

    /// Spawn the timer that flushes every `flush_interval`
    pub fn spawn_timer(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let pipeline = self.clone();
        let period = self.inner.flush_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(flush_interval_ms = period.as_millis() as u64, "flush timer started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let flushed = pipeline.flush().await;
                        if flushed > 0 {
                            debug!(flushed, "timer flush");
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }

            debug!("flush timer stopped");
        })
    }

    /// Stop admitting, flush the remainder and wait for in-flight writes
    ///
    /// Returns only after every reading reported `Accepted` has been written
    /// or handed to the failure policy.
    ///
    /// # Errors
    ///
    /// `ShutdownTimeout` if the writes do not finish within `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<DrainReport, IngestError> {
        self.inner.accepting.store(false, Ordering::SeqCst);
        info!(buffered = self.inner.buffer.len(), "draining ingestion pipeline");

        let drain = async {
            let token = self.inner.tracker.token();
            let flushed = match self.inner.buffer.close() {
                Some(batch) => {
                    let count = batch.len();
                    self.dispatch(batch, token).await;
                    count
                }
                None => {
                    drop(token);
                    0
                }
            };
            self.inner.tracker.close();
            self.inner.tracker.wait().await;
            flushed
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(flushed) => {
                let metrics = self.inner.metrics.snapshot();
                info!(
                    flushed,
                    rows_written = metrics.rows_written,
                    write_failures = metrics.write_failures,
                    "ingestion pipeline drained"
                );
                Ok(DrainReport { flushed, metrics })
            }
            Err(_) => Err(IngestError::ShutdownTimeout {
                timeout,
                pending: self.inner.tracker.len(),
            }),
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.accepting.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Current buffer, settings and counters
    pub fn stats(&self) -> ProcessingStats {
        ProcessingStats {
            buffered: self.inner.buffer.len(),
            running: self.is_running(),
            batch_size: self.inner.buffer.batch_size(),
            flush_interval_ms: self.inner.flush_interval.as_millis() as u64,
            pending_writes: self.inner.tracker.len(),
            metrics: self.inner.metrics.snapshot(),
        }
    }
}

impl Inner {
    async fn write(&self, readings: Vec<SensorReading>) {
        let start = Instant::now();
        match self.writer.write(&readings).await {
            Ok(rows) => {
                self.metrics.record_written(rows, start.elapsed());
                debug!(
                    writer = self.writer.name(),
                    rows,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "batch written"
                );
            }
            Err(e) => {
                self.metrics.record_write_failure();
                error!(
                    writer = self.writer.name(),
                    error = %e,
                    size = readings.len(),
                    "batch write failed"
                );
                self.fail(readings, e.into()).await;
            }
        }
    }

    async fn fail(&self, readings: Vec<SensorReading>, reason: FailureReason) {
        match &self.failures {
            FailedBatchSink::Drop => {
                self.metrics.record_dropped();
                warn!(size = readings.len(), reason = ?reason, "batch dropped");
            }
            FailedBatchSink::DeadLetter(tx) => {
                let size = readings.len();
                if tx.send(FailedBatch { reason, readings }).await.is_err() {
                    self.metrics.record_dropped();
                    error!(size, "dead-letter channel closed, batch dropped");
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
