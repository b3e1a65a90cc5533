//! Tier classification
//!
//! Picks the store that answers a filter from the length of its time range
//! and the metrics it asks for. Pure: the current time plays no part.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Duration;
use serde::Serialize;
use strata_config::RouterConfig;

use crate::error::{Result, RouterError};
use crate::filter::QueryFilter;
use crate::metric::{Metric, parse_metrics};

/// Storage tier serving a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Realtime table, last few minutes
    Hot,
    /// Raw facts partitioned by date
    Warm,
    /// Hourly pre-aggregated summaries
    Cold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Hot => "hot",
            Tier::Warm => "warm",
            Tier::Cold => "cold",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies filters onto tiers
#[derive(Debug, Clone)]
pub struct TierClassifier {
    hot_window: Duration,
    warm_window: Duration,
    cold_metrics: BTreeSet<Metric>,
}

impl Default for TierClassifier {
    fn default() -> Self {
        Self {
            hot_window: Duration::minutes(5),
            warm_window: Duration::hours(24),
            cold_metrics: BTreeSet::from([Metric::Temperature, Metric::Humidity]),
        }
    }
}

impl TierClassifier {
    /// Create a classifier with explicit thresholds
    pub fn new(hot_window: Duration, warm_window: Duration, cold_metrics: BTreeSet<Metric>) -> Self {
        Self {
            hot_window,
            warm_window,
            cold_metrics,
        }
    }

    /// Build from the `[router]` config section
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let hot_window = Duration::from_std(config.hot_window)
            .map_err(|_| RouterError::param("hot_window out of range"))?;
        let warm_window = Duration::from_std(config.warm_window)
            .map_err(|_| RouterError::param("warm_window out of range"))?;
        let cold_metrics = parse_metrics(&config.cold_metrics)?.into_iter().collect();

        Ok(Self::new(hot_window, warm_window, cold_metrics))
    }

    /// Decide which tier answers the filter
    ///
    /// Long ranges fall back to warm whenever a metric is missing from the
    /// cold summaries.
    pub fn classify(&self, filter: &QueryFilter) -> Tier {
        let range = filter.time_range.duration();

        if range <= self.hot_window {
            Tier::Hot
        } else if range <= self.warm_window {
            Tier::Warm
        } else if filter.metrics.iter().all(|m| self.cold_metrics.contains(m)) {
            Tier::Cold
        } else {
            Tier::Warm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timerange::TimeRange;

    fn filter(start: &str, end: &str, metrics: Vec<Metric>) -> QueryFilter {
        QueryFilter::new(TimeRange::parse(start, end).unwrap(), metrics).unwrap()
    }

    #[test]
    fn test_two_minutes_is_hot() {
        let f = filter(
            "2024-03-01 10:00:00",
            "2024-03-01 10:02:00",
            vec![Metric::Temperature],
        );
        assert_eq!(TierClassifier::default().classify(&f), Tier::Hot);
    }

    #[test]
    fn test_two_hours_is_warm() {
        let f = filter(
            "2024-03-01 10:00:00",
            "2024-03-01 12:00:00",
            vec![Metric::Pressure],
        );
        assert_eq!(TierClassifier::default().classify(&f), Tier::Warm);
    }

    #[test]
    fn test_three_days_summary_metrics_is_cold() {
        let f = filter(
            "2024-03-01 00:00:00",
            "2024-03-04 00:00:00",
            vec![Metric::Temperature, Metric::Humidity],
        );
        assert_eq!(TierClassifier::default().classify(&f), Tier::Cold);
    }

    #[test]
    fn test_three_days_with_pressure_is_warm() {
        let f = filter(
            "2024-03-01 00:00:00",
            "2024-03-04 00:00:00",
            vec![Metric::Temperature, Metric::Pressure],
        );
        assert_eq!(TierClassifier::default().classify(&f), Tier::Warm);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let classifier = TierClassifier::default();
        let five_min = filter(
            "2024-03-01 10:00:00",
            "2024-03-01 10:05:00",
            vec![Metric::Humidity],
        );
        assert_eq!(classifier.classify(&five_min), Tier::Hot);

        let one_day = filter(
            "2024-03-01 00:00:00",
            "2024-03-02 00:00:00",
            vec![Metric::Humidity],
        );
        assert_eq!(classifier.classify(&one_day), Tier::Warm);

        let just_over = filter(
            "2024-03-01 00:00:00",
            "2024-03-02 00:00:01",
            vec![Metric::Humidity],
        );
        assert_eq!(classifier.classify(&just_over), Tier::Cold);
    }

    #[test]
    fn test_from_config() {
        let config = RouterConfig {
            hot_window: std::time::Duration::from_secs(60),
            cold_metrics: vec!["temperature".into()],
            ..Default::default()
        };
        let classifier = TierClassifier::from_config(&config).unwrap();

        let f = filter(
            "2024-03-01 10:00:00",
            "2024-03-01 10:02:00",
            vec![Metric::Temperature],
        );
        assert_eq!(classifier.classify(&f), Tier::Warm);

        let f = filter(
            "2024-03-01 00:00:00",
            "2024-03-04 00:00:00",
            vec![Metric::Humidity],
        );
        assert_eq!(classifier.classify(&f), Tier::Warm);
    }

    #[test]
    fn test_from_config_unknown_metric() {
        let config = RouterConfig {
            cold_metrics: vec!["wind".into()],
            ..Default::default()
        };
        assert!(TierClassifier::from_config(&config).is_err());
    }
}
