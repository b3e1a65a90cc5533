//! Rendering of canonical rows for the terminal
//!
//! Table and CSV put one column per metric aggregate, in the order the
//! metrics were requested. JSON is the serialized rows.

use anyhow::Result;
use strata_query::OutputFormat;
use strata_router::{CanonicalRow, Metric};

/// Cap on table column width
const MAX_WIDTH: usize = 50;

/// Render rows in the requested format
pub fn render(rows: &[CanonicalRow], metrics: &[Metric], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows, metrics)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => Ok(render_csv(rows, metrics)),
    }
}

fn header(metrics: &[Metric]) -> Vec<String> {
    let mut columns = vec![
        "device_id".to_string(),
        "device_name".to_string(),
        "device_type".to_string(),
    ];
    for metric in metrics {
        columns.push(format!("{}_avg", metric));
        columns.push(format!("{}_max", metric));
        columns.push(format!("{}_min", metric));
    }
    columns.push("record_count".to_string());
    columns
}

fn cells(row: &CanonicalRow, metrics: &[Metric]) -> Vec<String> {
    let mut values = vec![
        row.device_id.clone(),
        row.device_name.clone(),
        row.device_type.clone(),
    ];
    for metric in metrics {
        match row.metrics.get(metric) {
            Some(agg) => {
                values.push(format_number(agg.avg));
                values.push(format_number(agg.max));
                values.push(format_number(agg.min));
            }
            None => values.extend(std::iter::repeat_n(String::new(), 3)),
        }
    }
    values.push(row.record_count.to_string());
    values
}

fn format_number(value: f64) -> String {
    format!("{:.2}", value)
}

fn render_table(rows: &[CanonicalRow], metrics: &[Metric]) -> String {
    if rows.is_empty() {
        return "(empty result)".to_string();
    }

    let header = header(metrics);
    let body: Vec<Vec<String>> = rows.iter().map(|row| cells(row, metrics)).collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in &body {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(value.chars().count());
        }
    }
    for width in &mut widths {
        *width = (*width).min(MAX_WIDTH);
    }

    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(join_padded(&header, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &body {
        lines.push(join_padded(row, &widths));
    }
    lines.join("\n")
}

fn join_padded(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            if value.chars().count() > *width {
                let cut: String = value.chars().take(width.saturating_sub(3)).collect();
                format!("{}...", cut)
            } else {
                format!("{:width$}", value, width = *width)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn render_csv(rows: &[CanonicalRow], metrics: &[Metric]) -> String {
    let mut lines = vec![header(metrics).join(",")];
    for row in rows {
        let values: Vec<String> = cells(row, metrics).iter().map(|v| csv_escape(v)).collect();
        lines.push(values.join(","));
    }
    lines.join("\n")
}

/// Quote if the value contains a comma, newline or quote
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('\n') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
