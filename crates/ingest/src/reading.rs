//! Sensor readings
//!
//! [`RawReading`] is the wire shape of one JSON message, every field
//! optional. [`SensorReading`] is what survives validation.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Status assigned when a message carries none
pub const DEFAULT_STATUS: &str = "NORMAL";

/// Position of the sensor in the device frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

/// Timestamp as sent: a formatted string or epoch milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    Text(String),
}

impl RawTimestamp {
    /// Resolve to a wall-clock timestamp
    ///
    /// Accepts RFC 3339 (converted to UTC), `yyyy-MM-ddTHH:mm:ss[.fff]`,
    /// `yyyy-MM-dd HH:mm:ss[.fff]` and epoch milliseconds.
    pub fn parse(&self) -> Option<NaiveDateTime> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.naive_utc()),
            RawTimestamp::Text(s) => {
                let s = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.naive_utc());
                }
                ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            }
        }
    }
}

/// One message as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReading {
    pub data_id: Option<String>,
    pub robot_id: Option<String>,
    pub sensor_id: Option<String>,
    pub sensor_type: Option<String>,
    pub timestamp: Option<RawTimestamp>,
    pub metrics: Option<BTreeMap<String, Option<f64>>>,
    pub status: Option<String>,
    pub location: Option<Location>,
    pub unit: Option<String>,
    pub precision: Option<f64>,
}

/// A validated reading, ready for the hot store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub data_id: String,
    pub robot_id: String,
    pub sensor_id: String,
    pub sensor_type: String,
    pub timestamp: NaiveDateTime,
    pub metrics: BTreeMap<String, f64>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
}

impl SensorReading {
    /// Partition key used upstream: `robotId#sensorId`
    pub fn message_key(&self) -> String {
        format!("{}#{}", self.robot_id, self.sensor_id)
    }

    /// Value of one metric, if present
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = at("2024-03-01 10:15:30");
        for raw in [
            RawTimestamp::Text("2024-03-01T10:15:30".into()),
            RawTimestamp::Text("2024-03-01 10:15:30".into()),
            RawTimestamp::Text("2024-03-01T10:15:30Z".into()),
            RawTimestamp::Text("2024-03-01T18:15:30+08:00".into()),
            RawTimestamp::Millis(1_709_288_130_000),
        ] {
            assert_eq!(raw.parse(), Some(expected), "{:?}", raw);
        }
    }

    #[test]
    fn test_timestamp_fraction() {
        let raw = RawTimestamp::Text("2024-03-01T10:15:30.250".into());
        assert_eq!(raw.parse(), Some(at("2024-03-01 10:15:30.250")));
    }

    #[test]
    fn test_timestamp_garbage() {
        assert_eq!(RawTimestamp::Text("yesterday".into()).parse(), None);
        assert_eq!(RawTimestamp::Text("".into()).parse(), None);
    }

    #[test]
    fn test_raw_reading_camel_case() {
        let json = r#"{
            "dataId": "d-1",
            "robotId": "R001",
            "sensorId": "S1",
            "sensorType": "TEMP_SENSOR",
            "timestamp": 1709288130000,
            "metrics": {"temperature": 21.5, "humidity": null},
            "location": {"x": 1.0, "y": 2.0}
        }"#;
        let raw: RawReading = serde_json::from_str(json).unwrap();

        assert_eq!(raw.robot_id.as_deref(), Some("R001"));
        assert_eq!(raw.timestamp, Some(RawTimestamp::Millis(1_709_288_130_000)));
        let metrics = raw.metrics.unwrap();
        assert_eq!(metrics["temperature"], Some(21.5));
        assert_eq!(metrics["humidity"], None);
        assert_eq!(raw.location.unwrap().z, None);
        assert!(raw.status.is_none());
    }

    #[test]
    fn test_message_key() {
        let reading = SensorReading {
            data_id: "d-1".into(),
            robot_id: "R001".into(),
            sensor_id: "S7".into(),
            sensor_type: "TEMP_SENSOR".into(),
            timestamp: at("2024-03-01 10:15:30"),
            metrics: BTreeMap::from([("temperature".to_string(), 21.5)]),
            status: DEFAULT_STATUS.into(),
            location: None,
            unit: None,
            precision: None,
        };
        assert_eq!(reading.message_key(), "R001#S7");
        assert_eq!(reading.metric("temperature"), Some(21.5));
        assert_eq!(reading.metric("pressure"), None);
    }
}
