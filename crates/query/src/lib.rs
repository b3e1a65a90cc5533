//! Strata Query - parameterized reads against the storage tiers
//!
//! Every tier is reached through the same [`QueryBackend`] trait, which
//! executes a [`QueryDescriptor`]: a structured SELECT whose caller-supplied
//! values travel as typed bind parameters.
//!
//! # Usage
//!
//! ```ignore
//! use strata_query::{ClickHouseBackend, ClickHouseBackendConfig, QueryBackend};
//!
//! let config = ClickHouseBackendConfig::new("http://localhost:8123", "warehouse");
//! let warm = ClickHouseBackend::with_name(&config, "warm");
//!
//! let result = warm.execute(&descriptor).await?;
//! println!("Rows: {}", result.row_count);
//! ```

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod result;

// Re-exports
pub use backend::QueryBackend;
pub use backend::clickhouse::{ClickHouseBackend, ClickHouseBackendConfig};
pub use descriptor::{Comparison, DATETIME_FORMAT, Join, ParamValue, Predicate, QueryDescriptor};
pub use error::QueryError;
pub use result::{Column, DataType, QueryResult};

/// Output format for query results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON array of objects
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("unknown format: {}", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
