//! @ai:module:intent Metric types derived from stored run results
//! @ai:module:layer domain
//! @ai:module:public_api AggregatedMetrics, MetricsByModel, SummaryStatistics, ModelStatus, Metric, Direction, AggregationMode
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// @ai:intent Whether a model produced at least one successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Available,
    Unavailable,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Available => "available",
            ModelStatus::Unavailable => "unavailable",
        }
    }
}

/// @ai:intent Summary statistics for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub status: ModelStatus,
    pub avg_accuracy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_accuracy: Option<f64>,
    pub avg_latency: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std_latency: Option<f64>,
    pub min_latency: f64,
    pub max_latency: f64,
    pub tokens_per_second: f64,
    pub error_rate: f64,
    pub total_runs: u32,
    pub successful_runs: u32,
}

impl AggregatedMetrics {
    /// @ai:intent Metrics for a model whose every attempt failed
    /// @ai:effects pure
    pub fn unavailable(total_runs: u32) -> Self {
        Self {
            status: ModelStatus::Unavailable,
            avg_accuracy: 0.0,
            std_accuracy: None,
            avg_latency: 0.0,
            std_latency: None,
            min_latency: 0.0,
            max_latency: 0.0,
            tokens_per_second: 0.0,
            error_rate: 1.0,
            total_runs,
            successful_runs: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == ModelStatus::Available
    }
}

/// Aggregated metrics keyed by model id, iterated in sorted order
pub type MetricsByModel = BTreeMap<String, AggregatedMetrics>;

/// @ai:intent Cross-model overview used by the narrative summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_models: usize,
    pub available_models: usize,
    pub best_accuracy_model: Option<String>,
    pub fastest_model: Option<String>,
    pub highest_throughput_model: Option<String>,
    pub overall_avg_accuracy: f64,
    pub overall_avg_latency: f64,
}

/// @ai:intent Numeric fields of AggregatedMetrics addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    AvgAccuracy,
    StdAccuracy,
    AvgLatency,
    StdLatency,
    MinLatency,
    MaxLatency,
    TokensPerSecond,
    ErrorRate,
    TotalRuns,
    SuccessfulRuns,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::AvgAccuracy,
        Metric::StdAccuracy,
        Metric::AvgLatency,
        Metric::StdLatency,
        Metric::MinLatency,
        Metric::MaxLatency,
        Metric::TokensPerSecond,
        Metric::ErrorRate,
        Metric::TotalRuns,
        Metric::SuccessfulRuns,
    ];

    /// @ai:intent snake_case field name
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::AvgAccuracy => "avg_accuracy",
            Metric::StdAccuracy => "std_accuracy",
            Metric::AvgLatency => "avg_latency",
            Metric::StdLatency => "std_latency",
            Metric::MinLatency => "min_latency",
            Metric::MaxLatency => "max_latency",
            Metric::TokensPerSecond => "tokens_per_second",
            Metric::ErrorRate => "error_rate",
            Metric::TotalRuns => "total_runs",
            Metric::SuccessfulRuns => "successful_runs",
        }
    }

    /// @ai:intent Human-readable label for reports
    /// @ai:effects pure
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }

    /// @ai:intent Value of this metric for a model, None when not computed
    /// @ai:effects pure
    pub fn value(&self, metrics: &AggregatedMetrics) -> Option<f64> {
        match self {
            Metric::AvgAccuracy => Some(metrics.avg_accuracy),
            Metric::StdAccuracy => metrics.std_accuracy,
            Metric::AvgLatency => Some(metrics.avg_latency),
            Metric::StdLatency => metrics.std_latency,
            Metric::MinLatency => Some(metrics.min_latency),
            Metric::MaxLatency => Some(metrics.max_latency),
            Metric::TokensPerSecond => Some(metrics.tokens_per_second),
            Metric::ErrorRate => Some(metrics.error_rate),
            Metric::TotalRuns => Some(metrics.total_runs as f64),
            Metric::SuccessfulRuns => Some(metrics.successful_runs as f64),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that is not a known metric
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Metric::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == name)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

/// @ai:intent Whether larger or smaller values are better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Maximize,
    Minimize,
}

/// @ai:intent How errored runs count toward average accuracy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Errored runs contribute 0.0, penalizing unreliable models
    #[default]
    IncludeErrors,
    /// Average over successful runs only
    SuccessfulOnly,
}
