//! Ingestion buffer
//!
//! Accumulates admitted readings behind one lock. A flush swaps the live
//! batch for an empty one inside the critical section, so a size flush and
//! a timer flush can race without losing or repeating a reading. Closing
//! happens under the same lock, so no reading slips in after the final take.

use std::mem;
use std::time::Instant;

use parking_lot::Mutex;

use crate::reading::SensorReading;

/// Readings accumulated since the last flush
#[derive(Debug)]
pub struct PendingBatch {
    pub readings: Vec<SensorReading>,
    pub created_at: Instant,
}

impl PendingBatch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            readings: Vec::with_capacity(capacity),
            created_at: Instant::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Time since the first slot was opened
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}

/// What happened to an admitted reading
#[derive(Debug)]
pub enum Admission {
    /// Held until the next flush
    Buffered,
    /// Threshold reached; the caller owns the batch
    Full(PendingBatch),
    /// Buffer closed; the reading was not kept
    Closed,
}

#[derive(Debug)]
struct Live {
    batch: PendingBatch,
    closed: bool,
}

/// Size-triggered batch accumulator
#[derive(Debug)]
pub struct IngestBuffer {
    live: Mutex<Live>,
    batch_size: usize,
}

impl IngestBuffer {
    /// Create a buffer that hands out a batch every `batch_size` readings
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            live: Mutex::new(Live {
                batch: PendingBatch::with_capacity(batch_size),
                closed: false,
            }),
            batch_size,
        }
    }

    /// Append a reading; hands back the full batch when the threshold is reached
    pub fn admit(&self, reading: SensorReading) -> Admission {
        let mut live = self.live.lock();
        if live.closed {
            return Admission::Closed;
        }
        live.batch.readings.push(reading);
        if live.batch.readings.len() >= self.batch_size {
            Admission::Full(self.swap(&mut live))
        } else {
            Admission::Buffered
        }
    }

    /// Take whatever is buffered; `None` when empty
    pub fn take(&self) -> Option<PendingBatch> {
        let mut live = self.live.lock();
        if live.batch.readings.is_empty() {
            return None;
        }
        Some(self.swap(&mut live))
    }

    /// Refuse further readings and take the remainder
    ///
    /// Every reading admitted before this call is either in the returned
    /// batch or in a batch already handed out by `admit` or `take`.
    pub fn close(&self) -> Option<PendingBatch> {
        let mut live = self.live.lock();
        live.closed = true;
        if live.batch.readings.is_empty() {
            return None;
        }
        Some(self.swap(&mut live))
    }

    fn swap(&self, live: &mut Live) -> PendingBatch {
        mem::replace(&mut live.batch, PendingBatch::with_capacity(self.batch_size))
    }

    pub fn is_closed(&self) -> bool {
        self.live.lock().closed
    }

    /// Buffered reading count
    pub fn len(&self) -> usize {
        self.live.lock().batch.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;
