//! Strata Ingest - sensor readings into the hot store
//!
//! Readings arrive as JSON messages, are validated and deduplicated, then
//! buffered and written to the hot store in bulk. A batch is flushed when it
//! reaches `batch_size`, when the flush timer fires, or on demand.
//!
//! # Usage
//!
//! ```ignore
//! use strata_ingest::{ClickHouseHotStore, DuplicateFilter, FailedBatchSink, IngestPipeline,
//!                     ReadingValidator};
//!
//! let writer = Arc::new(ClickHouseHotStore::from_config(&config.stores.hot, "realtime_sensor_data"));
//! let pipeline = IngestPipeline::new(
//!     &config.ingest,
//!     ReadingValidator::from_config(&config.ingest),
//!     DuplicateFilter::new(config.ingest.dedup_capacity),
//!     writer,
//!     FailedBatchSink::Drop,
//! );
//!
//! let timer = pipeline.spawn_timer(cancel.clone());
//! pipeline.ingest_json(line).await;
//! pipeline.shutdown(config.ingest.shutdown_timeout).await?;
//! ```

pub mod buffer;
pub mod dedup;
pub mod error;
pub mod hot_store;
pub mod metrics;
pub mod pipeline;
pub mod reading;
pub mod validator;
pub mod writer;

#[cfg(test)]
mod validator_test;

pub use buffer::{Admission, IngestBuffer, PendingBatch};
pub use dedup::DuplicateFilter;
pub use error::{IngestError, Rejection, WriteError};
pub use hot_store::{ClickHouseHotStore, SensorRow};
pub use metrics::{IngestMetrics, MetricsSnapshot};
pub use pipeline::{
    DrainReport, FailedBatch, FailedBatchSink, FailureReason, IngestOutcome, IngestPipeline,
    ProcessingStats,
};
pub use reading::{DEFAULT_STATUS, Location, RawReading, RawTimestamp, SensorReading};
pub use validator::ReadingValidator;
pub use writer::BatchWriter;
