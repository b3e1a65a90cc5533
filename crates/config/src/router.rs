//! Tiered query router configuration

use std::time::Duration;

use serde::Deserialize;

/// Metrics the storage tiers carry as columns
pub const KNOWN_METRICS: &[&str] = &["temperature", "humidity", "pressure"];

/// Check if a metric name is carried by the stores
pub fn is_known_metric(name: &str) -> bool {
    KNOWN_METRICS.contains(&name)
}

/// Router configuration
///
/// # Example
///
/// ```toml
/// [router]
/// hot_window = "5m"
/// warm_window = "24h"
/// cold_metrics = ["temperature", "humidity"]
/// default_metrics = ["temperature", "humidity", "pressure"]
/// query_timeout = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Ranges up to this length are served by the hot tier
    #[serde(with = "humantime_serde")]
    pub hot_window: Duration,

    /// Ranges up to this length are served by the warm tier
    #[serde(with = "humantime_serde")]
    pub warm_window: Duration,

    /// Metrics present in the cold summaries
    pub cold_metrics: Vec<String>,

    /// Metrics queried when a request names none
    pub default_metrics: Vec<String>,

    /// Deadline applied to each query call
    #[serde(with = "humantime_serde")]
    pub query_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            hot_window: Duration::from_secs(5 * 60),
            warm_window: Duration::from_secs(24 * 60 * 60),
            cold_metrics: vec!["temperature".into(), "humidity".into()],
            default_metrics: KNOWN_METRICS.iter().map(|m| m.to_string()).collect(),
            query_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.hot_window, Duration::from_secs(300));
        assert_eq!(config.warm_window, Duration::from_secs(86_400));
        assert_eq!(config.cold_metrics, vec!["temperature", "humidity"]);
        assert_eq!(
            config.default_metrics,
            vec!["temperature", "humidity", "pressure"]
        );
    }

    #[test]
    fn test_windows_parse_humantime() {
        let toml = r#"
hot_window = "10m"
warm_window = "2d"
query_timeout = "5s"
"#;
        let config: RouterConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.hot_window, Duration::from_secs(600));
        assert_eq!(config.warm_window, Duration::from_secs(2 * 86_400));
        assert_eq!(config.query_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_known_metrics() {
        assert!(is_known_metric("pressure"));
        assert!(!is_known_metric("wind_speed"));
        assert!(!is_known_metric("Temperature"));
    }
}
