//! Per-tier query builders
//!
//! Each tier has its own schema, so each gets its own builder behind
//! [`TierQueryBuilder`]. All of them emit the same output columns:
//! `device_id`, `avg_<m>`, `max_<m>`, `min_<m>` per metric and `data_count`,
//! grouped and ordered by device.

mod cold;
mod hot;
mod warm;

pub use cold::ColdQueryBuilder;
pub use hot::HotQueryBuilder;
pub use warm::WarmQueryBuilder;

use strata_query::QueryDescriptor;

use crate::builder::QueryBuilder;
use crate::error::Result;
use crate::filter::QueryFilter;
use crate::tier::Tier;

/// Output column holding the row count
pub const COUNT_COLUMN: &str = "data_count";

/// Builds the query a tier runs for a filter
pub trait TierQueryBuilder: Send + Sync {
    /// Tier this builder targets
    fn tier(&self) -> Tier;

    /// Build a parameterized query
    ///
    /// # Errors
    ///
    /// Returns `QueryParam` if a device id or category fails the identifier
    /// allow-list. No descriptor is produced in that case.
    fn build(&self, filter: &QueryFilter) -> Result<QueryDescriptor>;
}

/// Plain AVG/MAX/MIN over raw metric columns
fn raw_aggregates(mut builder: QueryBuilder, filter: &QueryFilter, prefix: &str) -> QueryBuilder {
    for metric in &filter.metrics {
        let column = format!("{}{}", prefix, metric.as_str());
        builder = builder
            .select_as(format!("AVG({})", column), metric.avg_column())
            .select_as(format!("MAX({})", column), metric.max_column())
            .select_as(format!("MIN({})", column), metric.min_column());
    }
    builder.select_as("COUNT(*)", COUNT_COLUMN)
}
