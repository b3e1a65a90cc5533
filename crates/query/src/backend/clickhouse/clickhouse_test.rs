//! Tests for ClickHouse backend

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::*;
use crate::descriptor::{Comparison, ParamValue, Predicate};

fn backend() -> ClickHouseBackend {
    let config = ClickHouseBackendConfig::new("http://ch-warm:8123/", "warehouse")
        .with_max_execution_time(30);
    ClickHouseBackend::with_name(&config, "warm")
}

fn partition_query() -> QueryDescriptor {
    let mut params = BTreeMap::new();
    params.insert(
        "start_date".to_string(),
        ParamValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
    );
    params.insert(
        "devices".to_string(),
        ParamValue::StringList(vec!["R001".into(), "R 2".into()]),
    );
    QueryDescriptor {
        table: "sensor_fact_orc".into(),
        select: vec!["robot_id".into()],
        predicates: vec![
            Predicate::new("dt", Comparison::Gte, "start_date"),
            Predicate::new("robot_id", Comparison::In, "devices"),
        ],
        params,
        ..Default::default()
    }
}

// =============================================================================
// URL Building Tests
// =============================================================================

#[test]
fn test_build_url_settings() {
    let url = backend().build_url("SELECT 1", None);
    assert!(url.starts_with("http://ch-warm:8123/?database=warehouse&max_execution_time=30"));
    assert!(url.ends_with("&query=SELECT%201"));
}

#[test]
fn test_build_url_sends_params_out_of_band() {
    let query = partition_query();
    let sql = query.to_sql().unwrap();
    let url = backend().build_url(&sql, Some(&query));

    assert!(url.contains("&param_start_date=2024-03-01"));
    // ['R001','R 2']
    assert!(url.contains("&param_devices=%5B%27R001%27%2C%27R%202%27%5D"));
    // the SQL only carries placeholders
    assert!(url.contains("%7Bdevices%3AArray%28String%29%7D"));
}

#[test]
fn test_urlencoding_multibyte() {
    assert_eq!(urlencoding::encode("a b"), "a%20b");
    assert_eq!(urlencoding::encode("é"), "%C3%A9");
    assert_eq!(urlencoding::encode("safe-_.~"), "safe-_.~");
}

// =============================================================================
// Response Parsing Tests
// =============================================================================

#[test]
fn test_parse_empty_body() {
    let result = parse_json_each_row("\n", 3).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.execution_time_ms, 3);
}

#[test]
fn test_parse_rows_aligned_by_name() {
    let body = concat!(
        r#"{"device_id":"R001","avg_temperature":21.5,"data_count":"12"}"#,
        "\n",
        r#"{"data_count":"4","device_id":"R002","avg_temperature":null}"#,
        "\n"
    );
    let result = parse_json_each_row(body, 9).unwrap();

    assert_eq!(result.row_count, 2);
    assert_eq!(
        result.column_names(),
        vec!["avg_temperature", "data_count", "device_id"]
    );

    let id = result.column_index("device_id").unwrap();
    let count = result.column_index("data_count").unwrap();
    assert_eq!(result.rows[1][id], serde_json::json!("R002"));
    assert_eq!(result.rows[1][count], serde_json::json!("4"));
    assert_eq!(result.columns[0].data_type, DataType::Float64);
}

#[test]
fn test_parse_invalid_row() {
    let err = parse_json_each_row("{not json}", 0).unwrap_err();
    assert!(matches!(err, QueryError::Serialization(_)));
}

// =============================================================================
// Backend Metadata
// =============================================================================

#[test]
fn test_backend_name_and_debug() {
    let backend = backend();
    assert_eq!(backend.name(), "warm");
    let debug = format!("{:?}", backend);
    assert!(debug.contains("warehouse"));
    assert!(!debug.contains("password"));
}

#[test]
fn test_credentials() {
    let config = ClickHouseBackendConfig::default().with_credentials("reader", "secret");
    assert_eq!(config.username.as_deref(), Some("reader"));
    assert_eq!(config.password.as_deref(), Some("secret"));
    assert_eq!(config.database, "default");
}

#[tokio::test]
async fn test_execute_rejects_unbound_parameter_before_network() {
    let mut query = partition_query();
    query.params.remove("devices");

    let err = backend().execute(&query).await.unwrap_err();
    assert!(matches!(err, QueryError::UnboundParameter(_)));
}
