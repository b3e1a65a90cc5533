//! Warm tier: raw facts partitioned by `dt`

use strata_config::DEFAULT_WARM_TABLE;
use strata_query::QueryDescriptor;

use super::{TierQueryBuilder, raw_aggregates};
use crate::builder::QueryBuilder;
use crate::error::Result;
use crate::filter::QueryFilter;
use crate::tier::Tier;

/// Builds queries against the fact table
#[derive(Debug, Clone)]
pub struct WarmQueryBuilder {
    table: String,
}

impl Default for WarmQueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WARM_TABLE)
    }
}

impl WarmQueryBuilder {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl TierQueryBuilder for WarmQueryBuilder {
    fn tier(&self) -> Tier {
        Tier::Warm
    }

    fn build(&self, filter: &QueryFilter) -> Result<QueryDescriptor> {
        filter.validate_identifiers()?;

        let builder = QueryBuilder::new(self.table.as_str()).select_as("robot_id", "device_id");

        let query = raw_aggregates(builder, filter, "")
            .with_time_range(&filter.time_range, "event_time")
            .with_partition(&filter.time_range, "dt")
            .with_selection(filter, "robot_id", "sensor_type")
            .group_by("robot_id")
            .order_by("device_id")
            .build();

        Ok(query)
    }
}
