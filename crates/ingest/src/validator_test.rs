//! Tests for reading validation

use std::collections::BTreeMap;

use strata_config::MetricRange;

use crate::error::Rejection;
use crate::reading::{RawReading, RawTimestamp};
use crate::validator::ReadingValidator;

fn raw(metrics: &[(&str, Option<f64>)]) -> RawReading {
    RawReading {
        data_id: Some("d-1".into()),
        robot_id: Some("R001".into()),
        sensor_id: Some("S1".into()),
        sensor_type: Some("TEMP_SENSOR".into()),
        timestamp: Some(RawTimestamp::Text("2024-03-01T10:15:30".into())),
        metrics: Some(
            metrics
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        ),
        ..Default::default()
    }
}

#[test]
fn test_well_formed_reading_accepted() {
    let reading = ReadingValidator::default()
        .validate(raw(&[("temperature", Some(21.5)), ("humidity", Some(40.0))]))
        .unwrap();

    assert_eq!(reading.robot_id, "R001");
    assert_eq!(reading.status, "NORMAL");
    assert_eq!(reading.metric("humidity"), Some(40.0));
    assert_eq!(reading.timestamp.to_string(), "2024-03-01 10:15:30");
}

#[test]
fn test_non_finite_rejected() {
    let validator = ReadingValidator::default();
    for value in [Some(f64::NAN), Some(f64::INFINITY), Some(f64::NEG_INFINITY), None] {
        let err = validator
            .validate(raw(&[("temperature", Some(20.0)), ("vibration", value)]))
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::NonFinite {
                metric: "vibration".into()
            }
        );
    }
}

#[test]
fn test_out_of_range_rejected() {
    let err = ReadingValidator::default()
        .validate(raw(&[("humidity", Some(100.5))]))
        .unwrap_err();
    assert!(matches!(err, Rejection::OutOfRange { ref metric, .. } if metric == "humidity"));

    // bounds are inclusive
    assert!(
        ReadingValidator::default()
            .validate(raw(&[("temperature", Some(-50.0)), ("pressure", Some(1500.0))]))
            .is_ok()
    );
}

#[test]
fn test_metric_without_range_only_checked_for_finiteness() {
    let reading = ReadingValidator::default()
        .validate(raw(&[("vibration", Some(1.0e9))]))
        .unwrap();
    assert_eq!(reading.metric("vibration"), Some(1.0e9));
}

#[test]
fn test_custom_limits() {
    let validator = ReadingValidator::new(BTreeMap::from([(
        "temperature".to_string(),
        MetricRange::new(0.0, 40.0),
    )]));
    assert!(validator.validate(raw(&[("temperature", Some(45.0))])).is_err());
    // humidity no longer limited
    assert!(validator.validate(raw(&[("humidity", Some(250.0))])).is_ok());
}

#[test]
fn test_empty_metrics_rejected() {
    let validator = ReadingValidator::default();
    assert_eq!(validator.validate(raw(&[])), Err(Rejection::EmptyMetrics));

    let mut missing = raw(&[]);
    missing.metrics = None;
    assert_eq!(validator.validate(missing), Err(Rejection::EmptyMetrics));
}

#[test]
fn test_missing_fields_rejected() {
    let validator = ReadingValidator::default();

    let mut r = raw(&[("temperature", Some(20.0))]);
    r.robot_id = Some("   ".into());
    assert_eq!(validator.validate(r), Err(Rejection::MissingField("robotId")));

    let mut r = raw(&[("temperature", Some(20.0))]);
    r.data_id = None;
    assert_eq!(validator.validate(r), Err(Rejection::MissingField("dataId")));

    let mut r = raw(&[("temperature", Some(20.0))]);
    r.timestamp = None;
    assert_eq!(validator.validate(r), Err(Rejection::MissingField("timestamp")));
}

#[test]
fn test_invalid_timestamp_rejected() {
    let mut r = raw(&[("temperature", Some(20.0))]);
    r.timestamp = Some(RawTimestamp::Text("01/03/2024".into()));
    assert_eq!(
        ReadingValidator::default().validate(r),
        Err(Rejection::InvalidTimestamp("01/03/2024".into()))
    );
}

#[test]
fn test_blank_status_defaults() {
    let mut r = raw(&[("temperature", Some(20.0))]);
    r.status = Some("".into());
    assert_eq!(ReadingValidator::default().validate(r).unwrap().status, "NORMAL");

    let mut r = raw(&[("temperature", Some(20.0))]);
    r.status = Some("WARNING".into());
    assert_eq!(ReadingValidator::default().validate(r).unwrap().status, "WARNING");
}

#[test]
fn test_validate_json() {
    let validator = ReadingValidator::default();
    let line = r#"{"dataId":"d-9","robotId":"R002","sensorId":"S2","sensorType":"HUM_SENSOR",
                   "timestamp":"2024-03-01 08:00:00","metrics":{"humidity":55.0}}"#;
    let reading = validator.validate_json(line).unwrap();
    assert_eq!(reading.message_key(), "R002#S2");

    let err = validator.validate_json("{not json").unwrap_err();
    assert_eq!(err.kind(), "malformed");

    let err = validator.validate_json(r#"{"metrics": "hot"}"#).unwrap_err();
    assert_eq!(err.kind(), "malformed");
}
