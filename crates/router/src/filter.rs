//! Query filters
//!
//! A filter says what to read: a time range, optional device and category
//! restrictions, and the metrics to aggregate.

use crate::error::{Result, RouterError};
use crate::ident::check_identifiers;
use crate::metric::Metric;
use crate::timerange::TimeRange;

/// A complete filter for tier queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFilter {
    /// Inclusive time range
    pub time_range: TimeRange,
    /// Restrict to these devices (empty = all)
    pub devices: Vec<String>,
    /// Restrict to these sensor categories (empty = all)
    pub categories: Vec<String>,
    /// Metrics to aggregate, in request order, at least one
    pub metrics: Vec<Metric>,
}

impl QueryFilter {
    /// Create a filter over a time range
    ///
    /// Repeated metrics are collapsed, keeping the first occurrence.
    pub fn new(time_range: TimeRange, metrics: Vec<Metric>) -> Result<Self> {
        let mut unique = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !unique.contains(&metric) {
                unique.push(metric);
            }
        }

        if unique.is_empty() {
            return Err(RouterError::param("at least one metric is required"));
        }

        Ok(Self {
            time_range,
            devices: Vec::new(),
            categories: Vec::new(),
            metrics: unique,
        })
    }

    /// Restrict to a set of devices
    pub fn with_devices<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.devices.extend(devices.into_iter().map(Into::into));
        self
    }

    /// Restrict to a set of sensor categories
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    /// Check device ids and categories against the identifier allow-list
    pub fn validate_identifiers(&self) -> Result<()> {
        check_identifiers("device id", &self.devices)?;
        check_identifiers("category", &self.categories)
    }
}
