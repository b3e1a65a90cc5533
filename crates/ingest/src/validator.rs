//! Reading validation
//!
//! Turns a [`RawReading`] into a [`SensorReading`] or a [`Rejection`].
//! Never panics on bad input.

use std::collections::BTreeMap;

use strata_config::{IngestConfig, MetricRange, default_limits};

use crate::error::Rejection;
use crate::reading::{DEFAULT_STATUS, RawReading, RawTimestamp, SensorReading};

/// Validates readings against required fields and metric plausibility ranges
#[derive(Debug, Clone)]
pub struct ReadingValidator {
    limits: BTreeMap<String, MetricRange>,
}

impl Default for ReadingValidator {
    fn default() -> Self {
        Self::new(default_limits())
    }
}

impl ReadingValidator {
    /// Create with explicit ranges; metrics without a range are only
    /// checked for finiteness
    pub fn new(limits: BTreeMap<String, MetricRange>) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.limits.clone())
    }

    /// Validate and normalize one reading
    pub fn validate(&self, raw: RawReading) -> Result<SensorReading, Rejection> {
        let data_id = required(raw.data_id, "dataId")?;
        let robot_id = required(raw.robot_id, "robotId")?;
        let sensor_id = required(raw.sensor_id, "sensorId")?;
        let sensor_type = required(raw.sensor_type, "sensorType")?;

        let timestamp = match raw.timestamp {
            None => return Err(Rejection::MissingField("timestamp")),
            Some(RawTimestamp::Text(ref s)) if s.trim().is_empty() => {
                return Err(Rejection::MissingField("timestamp"));
            }
            Some(ts) => ts
                .parse()
                .ok_or_else(|| Rejection::InvalidTimestamp(describe(&ts)))?,
        };

        let raw_metrics = raw.metrics.unwrap_or_default();
        if raw_metrics.is_empty() {
            return Err(Rejection::EmptyMetrics);
        }

        let mut metrics = BTreeMap::new();
        for (name, value) in raw_metrics {
            let value = match value {
                Some(v) if v.is_finite() => v,
                _ => return Err(Rejection::NonFinite { metric: name }),
            };

            if let Some(range) = self.limits.get(&name)
                && !(range.min..=range.max).contains(&value)
            {
                return Err(Rejection::OutOfRange {
                    metric: name,
                    value,
                    min: range.min,
                    max: range.max,
                });
            }

            metrics.insert(name, value);
        }

        let status = raw
            .status
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        Ok(SensorReading {
            data_id,
            robot_id,
            sensor_id,
            sensor_type,
            timestamp,
            metrics,
            status,
            location: raw.location,
            unit: raw.unit,
            precision: raw.precision,
        })
    }

    /// Parse one JSON message and validate it
    pub fn validate_json(&self, line: &str) -> Result<SensorReading, Rejection> {
        let raw: RawReading =
            serde_json::from_str(line).map_err(|e| Rejection::Malformed(e.to_string()))?;
        self.validate(raw)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, Rejection> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Rejection::MissingField(field)),
    }
}

fn describe(ts: &RawTimestamp) -> String {
    match ts {
        RawTimestamp::Millis(ms) => ms.to_string(),
        RawTimestamp::Text(s) => s.clone(),
    }
}
