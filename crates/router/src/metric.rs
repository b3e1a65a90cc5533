//! Queryable sensor metrics
//!
//! Metric names become column names, so the set is closed.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RouterError;

/// A metric carried by every tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
}

impl Metric {
    /// All metrics, in canonical order
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Pressure];

    /// Column name in the hot and warm tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
        }
    }

    /// Stem of the pre-aggregated columns in the hourly summary
    /// (`avg_temp`, `max_humidity`, ...)
    pub fn summary_stem(&self) -> &'static str {
        match self {
            Metric::Temperature => "temp",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
        }
    }

    pub fn avg_column(&self) -> String {
        format!("avg_{}", self.as_str())
    }

    pub fn max_column(&self) -> String {
        format!("max_{}", self.as_str())
    }

    pub fn min_column(&self) -> String {
        format!("min_{}", self.as_str())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "pressure" => Ok(Metric::Pressure),
            _ => Err(RouterError::param(format!("unknown metric: {}", s))),
        }
    }
}

/// Parse a list of metric names, rejecting unknown ones
pub fn parse_metrics<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>, RouterError> {
    names.iter().map(|n| n.as_ref().parse()).collect()
}
