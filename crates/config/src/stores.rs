//! Storage tier connection settings
//!
//! Each tier is a ClickHouse endpoint with its own table. Tiers may share a
//! server or live on separate clusters.

use serde::Deserialize;

/// Default realtime table (hot tier)
pub const DEFAULT_HOT_TABLE: &str = "realtime_sensor_data";

/// Default device dimension joined by hot-tier queries
pub const DEFAULT_DEVICE_TABLE: &str = "dim_robot";

/// Default fact table (warm tier)
pub const DEFAULT_WARM_TABLE: &str = "sensor_fact_orc";

/// Default hourly summary (cold tier)
pub const DEFAULT_COLD_TABLE: &str = "sensor_hourly_mv";

/// Connection settings for one tier
///
/// Every field is optional; getters supply the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// ClickHouse HTTP URL
    /// Default: "http://localhost:8123"
    pub url: Option<String>,

    /// Database name
    /// Default: "default"
    pub database: Option<String>,

    /// Username
    pub username: Option<String>,

    /// Password
    pub password: Option<String>,

    /// Table holding this tier's data
    pub table: Option<String>,

    /// Server-side execution limit in seconds
    /// Default: 60
    pub max_execution_time: Option<u64>,
}

impl StoreConfig {
    /// Get the ClickHouse URL
    pub fn url(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| "http://localhost:8123".to_string())
    }

    /// Get the database
    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| "default".to_string())
    }

    /// Get the execution limit
    pub fn max_execution_time(&self) -> u64 {
        self.max_execution_time.unwrap_or(60)
    }

    /// Credentials, only when both halves are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    fn table_or(&self, default: &str) -> String {
        self.table.clone().unwrap_or_else(|| default.to_string())
    }
}

/// All three storage tiers
///
/// # Example
///
/// ```toml
/// [stores]
/// device_table = "dim_robot"
///
/// [stores.hot]
/// url = "http://ch-realtime:8123"
/// database = "sensors"
///
/// [stores.warm]
/// url = "http://ch-analytics:8123"
/// database = "warehouse"
/// username = "reader"
/// password = "secret"
///
/// [stores.cold]
/// url = "http://ch-analytics:8123"
/// database = "warehouse"
/// table = "sensor_hourly_mv"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoresConfig {
    /// Device dimension table joined by hot-tier queries
    pub device_table: Option<String>,

    /// Hot tier: recent minutes, also the ingestion target
    pub hot: StoreConfig,

    /// Warm tier: raw facts partitioned by date
    pub warm: StoreConfig,

    /// Cold tier: pre-aggregated hourly summaries
    pub cold: StoreConfig,
}

impl StoresConfig {
    /// Hot table name
    pub fn hot_table(&self) -> String {
        self.hot.table_or(DEFAULT_HOT_TABLE)
    }

    /// Device dimension table name
    pub fn device_table(&self) -> String {
        self.device_table
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_TABLE.to_string())
    }

    /// Warm table name
    pub fn warm_table(&self) -> String {
        self.warm.table_or(DEFAULT_WARM_TABLE)
    }

    /// Cold table name
    pub fn cold_table(&self) -> String {
        self.cold.table_or(DEFAULT_COLD_TABLE)
    }
}
