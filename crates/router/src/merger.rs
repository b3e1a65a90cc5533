//! Result merging
//!
//! Maps a tier's native rows onto [`CanonicalRow`]s. Numbers may arrive as
//! JSON numbers or strings (ClickHouse quotes 64-bit integers). Rows sharing
//! a device are combined: counts summed, averages weighted by count, max of
//! maxes, min of mins. Null cells take no part in combining; a field with no
//! sample at all reads as zero.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use strata_query::QueryResult;

use crate::error::{Result, RouterError};
use crate::filter::QueryFilter;
use crate::metric::Metric;
use crate::tiers::COUNT_COLUMN;

/// avg/max/min of one metric for one device
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricAggregate {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// One device's aggregates, identical in shape for every tier
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRow {
    pub device_id: String,
    pub device_name: String,
    pub device_type: String,
    pub metrics: BTreeMap<Metric, MetricAggregate>,
    pub record_count: u64,
}

/// Merge a tier result into canonical rows sorted by device id
pub fn merge(result: &QueryResult, filter: &QueryFilter) -> Result<Vec<CanonicalRow>> {
    if result.is_empty() {
        return Ok(Vec::new());
    }

    let columns = Columns::resolve(result, &filter.metrics)?;
    let mut devices: BTreeMap<String, DeviceAccumulator> = BTreeMap::new();

    for row in &result.rows {
        let device_id = text(cell(row, Some(columns.device_id)));
        let count = count_value(cell(row, columns.count))?;

        let acc = devices.entry(device_id).or_default();
        fill_label(&mut acc.device_name, cell(row, columns.device_name));
        fill_label(&mut acc.device_type, cell(row, columns.device_type));

        for (metric, idx) in &columns.metrics {
            let sample = MetricSample {
                avg: number(cell(row, idx.avg))?,
                max: number(cell(row, idx.max))?,
                min: number(cell(row, idx.min))?,
            };
            acc.metrics.entry(*metric).or_default().add(sample, count);
        }
        acc.record_count += count;
    }

    Ok(devices
        .into_iter()
        .map(|(device_id, acc)| acc.finish(device_id))
        .collect())
}

// =============================================================================
// Column resolution
// =============================================================================

struct MetricColumns {
    avg: Option<usize>,
    max: Option<usize>,
    min: Option<usize>,
}

struct Columns {
    device_id: usize,
    device_name: Option<usize>,
    device_type: Option<usize>,
    count: Option<usize>,
    metrics: Vec<(Metric, MetricColumns)>,
}

impl Columns {
    fn resolve(result: &QueryResult, metrics: &[Metric]) -> Result<Self> {
        let device_id = result
            .column_index("device_id")
            .ok_or_else(|| RouterError::Backend("result has no device_id column".into()))?;

        Ok(Self {
            device_id,
            device_name: result.column_index("device_name"),
            device_type: result.column_index("device_type"),
            count: result.column_index(COUNT_COLUMN),
            metrics: metrics
                .iter()
                .map(|m| {
                    let columns = MetricColumns {
                        avg: result.column_index(&m.avg_column()),
                        max: result.column_index(&m.max_column()),
                        min: result.column_index(&m.min_column()),
                    };
                    (*m, columns)
                })
                .collect(),
        })
    }
}

// =============================================================================
// Accumulation
// =============================================================================

/// One row's cells for a metric; `None` where the cell was null
struct MetricSample {
    avg: Option<f64>,
    max: Option<f64>,
    min: Option<f64>,
}

#[derive(Default)]
struct MetricAccumulator {
    weighted_sum: f64,
    weight: u64,
    plain_sum: f64,
    samples: u32,
    max: Option<f64>,
    min: Option<f64>,
}

impl MetricAccumulator {
    fn add(&mut self, sample: MetricSample, count: u64) {
        if let Some(avg) = sample.avg {
            self.weighted_sum += avg * count as f64;
            self.weight += count;
            self.plain_sum += avg;
            self.samples += 1;
        }
        if let Some(max) = sample.max {
            self.max = Some(self.max.map_or(max, |m| m.max(max)));
        }
        if let Some(min) = sample.min {
            self.min = Some(self.min.map_or(min, |m| m.min(min)));
        }
    }

    fn finish(&self) -> MetricAggregate {
        // rows without counts still carry an average; fall back to their mean
        let avg = if self.weight > 0 {
            self.weighted_sum / self.weight as f64
        } else if self.samples > 0 {
            self.plain_sum / f64::from(self.samples)
        } else {
            0.0
        };

        MetricAggregate {
            avg,
            max: self.max.unwrap_or_default(),
            min: self.min.unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct DeviceAccumulator {
    device_name: String,
    device_type: String,
    metrics: BTreeMap<Metric, MetricAccumulator>,
    record_count: u64,
}

/// Keep the first non-empty label seen
fn fill_label(slot: &mut String, value: &Value) {
    if slot.is_empty() {
        *slot = text(value);
    }
}

impl DeviceAccumulator {
    fn finish(self, device_id: String) -> CanonicalRow {
        CanonicalRow {
            device_id,
            device_name: self.device_name,
            device_type: self.device_type,
            metrics: self
                .metrics
                .iter()
                .map(|(metric, acc)| (*metric, acc.finish()))
                .collect(),
            record_count: self.record_count,
        }
    }
}

// =============================================================================
// Cell decoding
// =============================================================================

fn cell(row: &[Value], idx: Option<usize>) -> &Value {
    idx.and_then(|i| row.get(i)).unwrap_or(&Value::Null)
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric cell; null and empty cells are `None`
fn number(value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => s
            .parse()
            .map(Some)
            .map_err(|_| RouterError::Backend(format!("non-numeric metric value: {:?}", s))),
        other => Err(RouterError::Backend(format!(
            "unexpected metric value: {}",
            other
        ))),
    }
}

fn count_value(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(c) => Ok(c),
            None => Ok(n.as_f64().map(|f| f.max(0.0).round() as u64).unwrap_or_default()),
        },
        Value::String(s) => match s.parse::<u64>() {
            Ok(c) => Ok(c),
            Err(_) => number(value).map(rounded_count),
        },
        other => number(other).map(rounded_count),
    }
}

fn rounded_count(value: Option<f64>) -> u64 {
    value.map(|f| f.max(0.0).round() as u64).unwrap_or_default()
}
