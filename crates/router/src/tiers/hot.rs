//! Hot tier: realtime table joined with the device dimension

use strata_config::{DEFAULT_DEVICE_TABLE, DEFAULT_HOT_TABLE};
use strata_query::QueryDescriptor;

use super::{TierQueryBuilder, raw_aggregates};
use crate::builder::QueryBuilder;
use crate::error::Result;
use crate::filter::QueryFilter;
use crate::tier::Tier;

/// Builds queries against the realtime table
#[derive(Debug, Clone)]
pub struct HotQueryBuilder {
    table: String,
    device_table: String,
}

impl Default for HotQueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HOT_TABLE, DEFAULT_DEVICE_TABLE)
    }
}

impl HotQueryBuilder {
    pub fn new(table: impl Into<String>, device_table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            device_table: device_table.into(),
        }
    }
}

impl TierQueryBuilder for HotQueryBuilder {
    fn tier(&self) -> Tier {
        Tier::Hot
    }

    fn build(&self, filter: &QueryFilter) -> Result<QueryDescriptor> {
        filter.validate_identifiers()?;

        let builder = QueryBuilder::new(format!("{} AS s", self.table))
            .left_join(
                format!("{} AS r", self.device_table),
                "s.robot_id = r.robot_id",
            )
            .select_as("s.robot_id", "device_id")
            // one group per device even if the dimension repeats a robot_id
            .select_as("any(r.robot_name)", "device_name")
            .select_as("any(r.robot_type)", "device_type");

        let query = raw_aggregates(builder, filter, "s.")
            .with_time_range(&filter.time_range, "s.timestamp")
            .with_selection(filter, "s.robot_id", "s.sensor_type")
            .group_by("s.robot_id")
            .order_by("device_id")
            .build();

        Ok(query)
    }
}
