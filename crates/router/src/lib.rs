//! Strata Router
//!
//! Answers "aggregate these metrics per device over this time range" from
//! whichever storage tier is cheapest for the range.
//!
//! # Overview
//!
//! - **Classifier**: range length and metrics pick hot, warm or cold
//! - **Builders**: one per tier, emitting parameterized queries with a
//!   shared output shape
//! - **Merger**: tier rows become [`CanonicalRow`]s, one per device
//!
//! # Usage
//!
//! ```ignore
//! use strata_router::{Metric, QueryFilter, TimeRange, TieredRouter};
//!
//! let range = TimeRange::parse("2024-03-01 00:00:00", "2024-03-04 00:00:00")?;
//! let filter = QueryFilter::new(range, vec![Metric::Temperature])?
//!     .with_devices(["R001", "R002"]);
//!
//! let rows = router.query(&filter).await?;
//! ```

pub mod builder;
pub mod error;
pub mod filter;
pub mod ident;
pub mod merger;
pub mod metric;
pub mod router;
pub mod tier;
pub mod tiers;
pub mod timerange;

#[cfg(test)]
mod timerange_test;

// Re-exports for convenience
pub use builder::QueryBuilder;
pub use error::{Result, RouterError};
pub use filter::QueryFilter;
pub use ident::is_valid_identifier;
pub use merger::{CanonicalRow, MetricAggregate, merge};
pub use metric::{Metric, parse_metrics};
pub use router::{QueryPlan, TierRoute, TieredRouter};
pub use tier::{Tier, TierClassifier};
pub use tiers::{ColdQueryBuilder, HotQueryBuilder, TierQueryBuilder, WarmQueryBuilder};
pub use timerange::TimeRange;
