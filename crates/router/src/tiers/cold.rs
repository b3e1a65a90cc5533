//! Cold tier: hourly summaries
//!
//! Summary rows already hold per-hour avg/max/min and a `record_count`.
//! Averages are re-weighted by count so the result matches what the raw
//! facts would give.

use strata_config::DEFAULT_COLD_TABLE;
use strata_query::{Comparison, ParamValue, QueryDescriptor};

use super::{COUNT_COLUMN, TierQueryBuilder};
use crate::builder::{QueryBuilder, params};
use crate::error::Result;
use crate::filter::QueryFilter;
use crate::tier::Tier;

/// Builds queries against the hourly summary table
#[derive(Debug, Clone)]
pub struct ColdQueryBuilder {
    table: String,
}

impl Default for ColdQueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_COLD_TABLE)
    }
}

impl ColdQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl TierQueryBuilder for ColdQueryBuilder {
    fn tier(&self) -> Tier {
        Tier::Cold
    }

    fn build(&self, filter: &QueryFilter) -> Result<QueryDescriptor> {
        filter.validate_identifiers()?;

        let mut builder = QueryBuilder::new(self.table.as_str()).select_as("robot_id", "device_id");

        for metric in &filter.metrics {
            let stem = metric.summary_stem();
            builder = builder
                .select_as(
                    format!("SUM(avg_{} * record_count) / SUM(record_count)", stem),
                    metric.avg_column(),
                )
                .select_as(format!("MAX(max_{})", stem), metric.max_column())
                .select_as(format!("MIN(min_{})", stem), metric.min_column());
        }

        let range = &filter.time_range;
        let query = builder
            .select_as("SUM(record_count)", COUNT_COLUMN)
            // the hour containing the start counts
            .where_param_fn(
                "stat_hour",
                Comparison::Gte,
                "toStartOfHour",
                params::START,
                ParamValue::DateTime(range.start),
            )
            .where_param(
                "stat_hour",
                Comparison::Lte,
                params::END,
                ParamValue::DateTime(range.end),
            )
            .with_partition(range, "dt")
            .with_selection(filter, "robot_id", "sensor_type")
            .group_by("robot_id")
            .order_by("device_id")
            .build();

        Ok(query)
    }
}
