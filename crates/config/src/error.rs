//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - invalid value
    #[error("[{section}] has invalid {field}: {message}")]
    InvalidValue {
        /// Config section (e.g., "ingest", "stores.hot")
        section: String,
        /// Field name
        field: &'static str,
        /// Error message
        message: String,
    },

    /// A metric name that the stores do not carry
    #[error("[{section}] {field} references unknown metric '{metric}'")]
    UnknownMetric {
        /// Config section
        section: String,
        /// Field name
        field: &'static str,
        /// The offending metric name
        metric: String,
    },
}

impl ConfigError {
    /// Create an InvalidValue error
    pub fn invalid_value(
        section: impl Into<String>,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section: section.into(),
            field,
            message: message.into(),
        }
    }

    /// Create an UnknownMetric error
    pub fn unknown_metric(
        section: impl Into<String>,
        field: &'static str,
        metric: impl Into<String>,
    ) -> Self {
        Self::UnknownMetric {
            section: section.into(),
            field,
            metric: metric.into(),
        }
    }
}
