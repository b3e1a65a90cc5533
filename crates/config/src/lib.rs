//! Strata Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file is a valid config; only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use strata_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[ingest]\nbatch_size = 50").unwrap();
//! assert_eq!(config.ingest.batch_size, 50);
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [ingest]
//! batch_size = 100
//! flush_interval = "5s"
//!
//! [stores.hot]
//! url = "http://localhost:8123"
//! database = "sensors"
//!
//! [router]
//! hot_window = "5m"
//! warm_window = "24h"
//! ```

mod error;
mod ingest;
mod logging;
mod router;
mod stores;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use ingest::{FailurePolicy, IngestConfig, MetricRange, OverflowPolicy, default_limits};
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use router::{KNOWN_METRICS, RouterConfig, is_known_metric};
pub use stores::{
    DEFAULT_COLD_TABLE, DEFAULT_DEVICE_TABLE, DEFAULT_HOT_TABLE, DEFAULT_WARM_TABLE, StoreConfig,
    StoresConfig,
};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Ingestion pipeline (validation, dedup, batching)
    pub ingest: IngestConfig,

    /// Storage tier connections
    pub stores: StoresConfig,

    /// Tier classification and query settings
    pub router: RouterConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.ingest.batch_size, 100);
        assert_eq!(config.router.hot_window, Duration::from_secs(300));
        assert_eq!(config.stores.hot_table(), DEFAULT_HOT_TABLE);
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[ingest]
batch_size = 250
flush_interval = "1s"
dedup_capacity = 5000
max_pending_batches = 8
overflow = "drop"
failure_policy = "dead_letter"
dead_letter_path = "/tmp/failed.jsonl"

[ingest.limits.temperature]
min = -20.0
max = 80.0

[stores]
device_table = "dim_device"

[stores.hot]
url = "http://ch-hot:8123"
database = "sensors"

[stores.warm]
url = "http://ch-warm:8123"
username = "reader"
password = "secret"

[router]
hot_window = "10m"
warm_window = "12h"
cold_metrics = ["temperature"]
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.ingest.batch_size, 250);
        assert_eq!(config.ingest.overflow, OverflowPolicy::Drop);
        assert_eq!(config.ingest.failure_policy, FailurePolicy::DeadLetter);
        assert_eq!(config.ingest.limits["temperature"], MetricRange::new(-20.0, 80.0));
        assert_eq!(config.stores.device_table(), "dim_device");
        assert_eq!(config.stores.hot.database(), "sensors");
        assert_eq!(config.stores.warm.credentials(), Some(("reader", "secret")));
        assert_eq!(config.router.warm_window, Duration::from_secs(12 * 3600));
        assert_eq!(config.router.cold_metrics, vec!["temperature"]);
    }

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_str(include_str!("../../../configs/strata.toml")).unwrap();
        assert_eq!(config.ingest.limits, default_limits());
        assert_eq!(config.stores.cold.max_execution_time(), 120);
        assert_eq!(config.router.query_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let err = Config::from_str("[ingest]\nbatch_size = 0").unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let toml = r#"
[ingest.limits.pressure]
min = 1500.0
max = 500.0
"#;
        let err = Config::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("ingest.limits.pressure"));
    }

    #[test]
    fn test_hot_window_must_be_shorter_than_warm() {
        let toml = r#"
[router]
hot_window = "2h"
warm_window = "1h"
"#;
        let err = Config::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("hot_window"));
    }

    #[test]
    fn test_unknown_cold_metric_rejected() {
        let toml = r#"
[router]
cold_metrics = ["temperature", "vibration"]
"#;
        let err = Config::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMetric { .. }));
        assert!(err.to_string().contains("vibration"));
    }

    #[test]
    fn test_empty_default_metrics_rejected() {
        let err = Config::from_str("[router]\ndefault_metrics = []").unwrap_err();
        assert!(err.to_string().contains("default_metrics"));
    }

    #[test]
    fn test_table_injection_rejected() {
        let toml = r#"
[stores.warm]
table = "sensor_fact_orc; DROP TABLE dim_robot"
"#;
        let err = Config::from_str(toml).unwrap_err();
        assert!(err.to_string().contains("stores.warm"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\nbatch_size = 42").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.ingest.batch_size, 42);
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/strata.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
