//! Logging configuration
//!
//! Controls how strata emits its own diagnostics.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Very verbose, includes every admitted reading
    Trace,
    /// Per-batch and per-query detail
    Debug,
    /// Lifecycle events (default)
    #[default]
    Info,
    /// Rejections that need attention, slow writes
    Warn,
    /// Failed batches and unreachable stores
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Where log lines are written
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr (default, keeps stdout free for query results)
    #[default]
    Stderr,
    /// stdout
    Stdout,
    /// Append to a file
    #[serde(untagged)]
    File(String),
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "/var/log/strata/strata.log"
/// directives = "strata_ingest=trace,reqwest=warn"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level
    pub level: LogLevel,

    /// Output format (console, json)
    pub format: LogFormat,

    /// Output destination (stdout, stderr, or file path)
    pub output: LogOutput,

    /// Extra `EnvFilter` directives appended after the base level
    pub directives: Option<String>,
}

impl LogConfig {
    /// Build the filter string for `tracing_subscriber::EnvFilter`
    ///
    /// `level_override` replaces the configured base level (CLI flag).
    pub fn filter_directives(&self, level_override: Option<&str>) -> String {
        let base = level_override.unwrap_or(self.level.as_str());
        match self.directives.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{},{}", base, extra),
            _ => base.to_string(),
        }
    }
}
