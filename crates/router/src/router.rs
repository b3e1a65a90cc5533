//! Tiered router
//!
//! Classifies a filter, builds the tier's query, runs it on the tier's
//! backend and merges the rows. Holds no mutable state.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use strata_query::{QueryBackend, QueryDescriptor};
use tracing::{debug, info};

use crate::error::Result;
use crate::filter::QueryFilter;
use crate::merger::{CanonicalRow, merge};
use crate::tier::{Tier, TierClassifier};
use crate::tiers::TierQueryBuilder;

/// A tier's query builder paired with the store it runs on
pub struct TierRoute {
    pub builder: Box<dyn TierQueryBuilder>,
    pub backend: Arc<dyn QueryBackend>,
}

impl TierRoute {
    pub fn new(builder: impl TierQueryBuilder + 'static, backend: Arc<dyn QueryBackend>) -> Self {
        Self {
            builder: Box::new(builder),
            backend,
        }
    }
}

/// The decision for a filter, without touching a store
#[derive(Debug, Clone, Serialize)]
pub struct QueryPlan {
    pub tier: Tier,
    pub descriptor: QueryDescriptor,
}

/// Routes filters to the hot, warm or cold store
pub struct TieredRouter {
    classifier: TierClassifier,
    hot: TierRoute,
    warm: TierRoute,
    cold: TierRoute,
}

impl TieredRouter {
    pub fn new(classifier: TierClassifier, hot: TierRoute, warm: TierRoute, cold: TierRoute) -> Self {
        Self {
            classifier,
            hot,
            warm,
            cold,
        }
    }

    fn route(&self, tier: Tier) -> &TierRoute {
        match tier {
            Tier::Hot => &self.hot,
            Tier::Warm => &self.warm,
            Tier::Cold => &self.cold,
        }
    }

    /// Classify and build, returning the query that would run
    pub fn plan(&self, filter: &QueryFilter) -> Result<QueryPlan> {
        let tier = self.classifier.classify(filter);
        let descriptor = self.route(tier).builder.build(filter)?;
        Ok(QueryPlan { tier, descriptor })
    }

    /// Answer a filter with canonical per-device rows, sorted by device id
    ///
    /// # Errors
    ///
    /// - `QueryParam` for bad identifiers; no store is contacted
    /// - `BackendUnavailable` when the tier's store cannot be reached
    /// - `Backend` when the store fails the query
    pub async fn query(&self, filter: &QueryFilter) -> Result<Vec<CanonicalRow>> {
        let plan = self.plan(filter)?;
        let backend = &self.route(plan.tier).backend;

        debug!(
            tier = %plan.tier,
            backend = backend.name(),
            duration_secs = filter.time_range.duration().num_seconds(),
            metrics = filter.metrics.len(),
            "routing query"
        );

        let start = Instant::now();
        let result = backend.execute(&plan.descriptor).await?;
        let rows = merge(&result, filter)?;

        info!(
            tier = %plan.tier,
            rows = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "query complete"
        );

        Ok(rows)
    }
}
