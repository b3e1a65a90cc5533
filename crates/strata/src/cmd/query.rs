//! Query command - aggregate readings per device from the matching tier
//!
//! # Usage
//!
//! ```bash
//! strata query --start "2024-03-01 10:00:00" --end "2024-03-01 10:05:00"
//! strata query --start "2024-03-01 00:00:00" --end "2024-03-01 12:00:00" \
//!     --device R001 --device R002 --metric temperature --format json
//! strata query --start "2024-02-01 00:00:00" --end "2024-03-01 00:00:00" --explain
//! ```
//!
//! Connection details come from `[stores.hot|warm|cold]`, windows and the
//! default metrics from `[router]`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use strata_config::{Config, RouterConfig, StoreConfig};
use strata_query::{ClickHouseBackend, ClickHouseBackendConfig, OutputFormat, ParamValue, QueryBackend};
use strata_router::{
    ColdQueryBuilder, HotQueryBuilder, QueryFilter, QueryPlan, Tier, TierClassifier, TierRoute,
    TieredRouter, TimeRange, WarmQueryBuilder, parse_metrics,
};
use tracing::debug;

use crate::output;

/// Query command arguments
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Range start, `yyyy-MM-dd HH:mm:ss`
    #[arg(long)]
    start: String,

    /// Range end (inclusive), `yyyy-MM-dd HH:mm:ss`
    #[arg(long)]
    end: String,

    /// Only these devices (repeatable)
    #[arg(long = "device", value_name = "ID")]
    devices: Vec<String>,

    /// Only these sensor categories (repeatable)
    #[arg(long = "category", value_name = "TYPE")]
    categories: Vec<String>,

    /// Metrics to aggregate (repeatable, default from [router])
    #[arg(long = "metric", value_name = "METRIC")]
    metrics: Vec<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table")]
    format: String,

    /// Print the chosen tier and query without running it
    #[arg(long)]
    explain: bool,
}

/// `--explain` output
#[derive(Debug, Serialize)]
struct Explain<'a> {
    tier: Tier,
    sql: String,
    params: &'a BTreeMap<String, ParamValue>,
}

/// Run the query command
pub async fn run(args: QueryArgs, config: Config) -> Result<()> {
    let format: OutputFormat = args
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid format: {}", e))?;

    let filter = build_filter(&args, &config.router)?;
    let router = build_router(&config)?;

    let plan = router.plan(&filter).context("failed to plan query")?;
    if args.explain {
        println!("{}", explain(&plan)?);
        return Ok(());
    }

    let start = Instant::now();
    let rows = tokio::time::timeout(config.router.query_timeout, router.query(&filter))
        .await
        .map_err(|_| anyhow::anyhow!("query timed out after {:?}", config.router.query_timeout))?
        .context("query execution failed")?;

    println!("{}", output::render(&rows, &filter.metrics, format)?);

    eprintln!(
        "\n{} device(s) in {}ms [{} tier]",
        rows.len(),
        start.elapsed().as_millis(),
        plan.tier
    );

    Ok(())
}

/// Build the filter, falling back to the configured default metrics
fn build_filter(args: &QueryArgs, router: &RouterConfig) -> Result<QueryFilter> {
    let range = TimeRange::parse(&args.start, &args.end).context("invalid time range")?;

    let names = if args.metrics.is_empty() {
        &router.default_metrics
    } else {
        &args.metrics
    };
    let metrics = parse_metrics(names)?;

    let filter = QueryFilter::new(range, metrics)?
        .with_devices(args.devices.clone())
        .with_categories(args.categories.clone());

    debug!(
        start = %args.start,
        end = %args.end,
        devices = filter.devices.len(),
        categories = filter.categories.len(),
        metrics = filter.metrics.len(),
        "query filter built"
    );

    Ok(filter)
}

/// Wire one ClickHouse backend per tier
fn build_router(config: &Config) -> Result<TieredRouter> {
    let classifier =
        TierClassifier::from_config(&config.router).context("invalid [router] section")?;
    let stores = &config.stores;

    Ok(TieredRouter::new(
        classifier,
        TierRoute::new(
            HotQueryBuilder::new(stores.hot_table(), stores.device_table()),
            backend(&stores.hot, "hot"),
        ),
        TierRoute::new(
            WarmQueryBuilder::new(stores.warm_table()),
            backend(&stores.warm, "warm"),
        ),
        TierRoute::new(
            ColdQueryBuilder::new(stores.cold_table()),
            backend(&stores.cold, "cold"),
        ),
    ))
}

fn backend(store: &StoreConfig, name: &'static str) -> Arc<dyn QueryBackend> {
    let mut config = ClickHouseBackendConfig::new(store.url(), store.database())
        .with_max_execution_time(store.max_execution_time());
    if let Some((user, password)) = store.credentials() {
        config = config.with_credentials(user, password);
    }
    Arc::new(ClickHouseBackend::with_name(&config, name))
}

fn explain(plan: &QueryPlan) -> Result<String> {
    let explain = Explain {
        tier: plan.tier,
        sql: plan.descriptor.to_sql()?,
        params: &plan.descriptor.params,
    };
    Ok(serde_json::to_string_pretty(&explain)?)
}
