//! ClickHouse hot store
//!
//! Writes batches into the realtime table with one native insert per batch.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use clickhouse::insert::Insert;
use clickhouse::{Client, Row};
use serde::Serialize;
use strata_config::StoreConfig;

use crate::error::WriteError;
use crate::reading::SensorReading;
use crate::writer::BatchWriter;

/// Row for the realtime table
///
/// ```sql
/// CREATE TABLE realtime_sensor_data (
///     data_id String,
///     robot_id LowCardinality(String),
///     sensor_id String,
///     sensor_type LowCardinality(String),
///     timestamp DateTime64(3),
///     temperature Nullable(Float64),
///     humidity Nullable(Float64),
///     pressure Nullable(Float64),
///     position_x Nullable(Float64),
///     position_y Nullable(Float64),
///     position_z Nullable(Float64),
///     status LowCardinality(String)
/// ) ENGINE = MergeTree()
/// ORDER BY (robot_id, timestamp);
/// ```
#[derive(Debug, Clone, PartialEq, Row, Serialize)]
pub struct SensorRow {
    pub data_id: String,
    pub robot_id: String,
    pub sensor_id: String,
    pub sensor_type: String,
    /// Milliseconds since the epoch
    pub timestamp: i64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_z: Option<f64>,
    pub status: String,
}

impl From<&SensorReading> for SensorRow {
    fn from(reading: &SensorReading) -> Self {
        let location = reading.location.unwrap_or_default();
        Self {
            data_id: reading.data_id.clone(),
            robot_id: reading.robot_id.clone(),
            sensor_id: reading.sensor_id.clone(),
            sensor_type: reading.sensor_type.clone(),
            timestamp: epoch_millis(reading.timestamp),
            temperature: reading.metric("temperature"),
            humidity: reading.metric("humidity"),
            pressure: reading.metric("pressure"),
            position_x: location.x,
            position_y: location.y,
            position_z: location.z,
            status: reading.status.clone(),
        }
    }
}

fn epoch_millis(ts: NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

/// Hot-store writer backed by the ClickHouse native insert
pub struct ClickHouseHotStore {
    client: Client,
    table: String,
}

impl ClickHouseHotStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// Build from the `[stores.hot]` section
    pub fn from_config(config: &StoreConfig, table: impl Into<String>) -> Self {
        let mut client = Client::default()
            .with_url(config.url())
            .with_database(config.database());

        if let Some((user, password)) = config.credentials() {
            client = client.with_user(user).with_password(password);
        }

        Self::new(client, table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl BatchWriter for ClickHouseHotStore {
    async fn write(&self, readings: &[SensorReading]) -> Result<u64, WriteError> {
        if readings.is_empty() {
            return Ok(0);
        }

        let mut insert: Insert<SensorRow> = self.client.insert(&self.table).await?;
        for reading in readings {
            insert.write(&SensorRow::from(reading)).await?;
        }
        insert.end().await?;

        tracing::debug!(table = %self.table, rows = readings.len(), "inserted batch");
        Ok(readings.len() as u64)
    }

    fn name(&self) -> &'static str {
        "clickhouse"
    }
}
