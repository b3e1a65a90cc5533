//! Configuration validation
//!
//! Validates config consistency:
//! - Batching and dedup sizes are positive
//! - Plausibility ranges are well formed
//! - Router windows are ordered and metric lists name known metrics
//! - Table names are plain identifiers (they are spliced into SQL text)

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::router::is_known_metric;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_ingest(config)?;
    validate_router(config)?;
    validate_stores(config)?;
    Ok(())
}

fn validate_ingest(config: &Config) -> Result<()> {
    let ingest = &config.ingest;

    for (field, value) in [
        ("batch_size", ingest.batch_size),
        ("dedup_capacity", ingest.dedup_capacity),
        ("max_pending_batches", ingest.max_pending_batches),
        ("dead_letter_capacity", ingest.dead_letter_capacity),
    ] {
        if value == 0 {
            return Err(ConfigError::invalid_value(
                "ingest",
                field,
                "must be greater than 0",
            ));
        }
    }

    if ingest.flush_interval.is_zero() {
        return Err(ConfigError::invalid_value(
            "ingest",
            "flush_interval",
            "must be greater than 0",
        ));
    }

    for (metric, range) in &ingest.limits {
        if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
            return Err(ConfigError::invalid_value(
                format!("ingest.limits.{}", metric),
                "min",
                format!("min ({}) must be below max ({})", range.min, range.max),
            ));
        }
    }

    Ok(())
}

fn validate_router(config: &Config) -> Result<()> {
    let router = &config.router;

    if router.hot_window.is_zero() || router.hot_window >= router.warm_window {
        return Err(ConfigError::invalid_value(
            "router",
            "hot_window",
            "must be non-zero and shorter than warm_window",
        ));
    }

    for (field, metrics) in [
        ("cold_metrics", &router.cold_metrics),
        ("default_metrics", &router.default_metrics),
    ] {
        if metrics.is_empty() {
            return Err(ConfigError::invalid_value(
                "router",
                field,
                "must list at least one metric",
            ));
        }
        if let Some(unknown) = metrics.iter().find(|m| !is_known_metric(m)) {
            return Err(ConfigError::unknown_metric("router", field, unknown.as_str()));
        }
    }

    Ok(())
}

fn validate_stores(config: &Config) -> Result<()> {
    let stores = &config.stores;

    for (section, table) in [
        ("stores.hot", stores.hot_table()),
        ("stores", stores.device_table()),
        ("stores.warm", stores.warm_table()),
        ("stores.cold", stores.cold_table()),
    ] {
        if !is_table_name(&table) {
            return Err(ConfigError::invalid_value(
                section,
                "table",
                format!("'{}' is not a plain table name", table),
            ));
        }
    }

    Ok(())
}

/// `name` or `database.name`, ASCII alphanumerics and underscores only
fn is_table_name(s: &str) -> bool {
    let mut parts = 0;
    for part in s.split('.') {
        parts += 1;
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
    }
    parts <= 2
}
