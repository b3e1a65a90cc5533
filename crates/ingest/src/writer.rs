//! Batch writer seam
//!
//! One call is one bulk insert. Failure covers the whole batch and is not
//! retried here.

use async_trait::async_trait;

use crate::error::WriteError;
use crate::reading::SensorReading;

/// Destination for flushed batches
#[async_trait]
pub trait BatchWriter: Send + Sync {
    /// Insert every reading; returns rows written
    async fn write(&self, readings: &[SensorReading]) -> Result<u64, WriteError>;

    /// Writer name for logging
    fn name(&self) -> &'static str;
}
