//! @ai:module:intent Statistical aggregation of run results per model
//! @ai:module:layer application
//! @ai:module:public_api MetricsAggregator, MetricsAggregatorTrait
//! @ai:module:stateless true

use crate::metrics::types::{
    AggregatedMetrics, AggregationMode, Direction, Metric, MetricsByModel, ModelStatus,
    SummaryStatistics,
};
use crate::store::{ResultStore, RunResult};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// @ai:intent Trait for metrics aggregation
pub trait MetricsAggregatorTrait: Send + Sync {
    /// @ai:intent Aggregate run results into per-model metrics
    fn aggregate(&self, results: &[RunResult]) -> MetricsByModel;
}

/// @ai:intent Derives per-model statistics from the raw result set
pub struct MetricsAggregator {
    mode: AggregationMode,
}

impl MetricsAggregator {
    /// @ai:intent Create a new metrics aggregator
    /// @ai:effects pure
    pub fn new(mode: AggregationMode) -> Self {
        Self { mode }
    }

    /// @ai:intent Load every stored record and aggregate it
    /// @ai:effects fs:read
    pub fn aggregate_store(&self, store: &ResultStore) -> Result<MetricsByModel> {
        let results = store
            .load_all()
            .with_context(|| format!("Failed to load results from {}", store.dir().display()))?;
        tracing::info!("Loaded {} results from {}", results.len(), store.dir().display());

        Ok(self.aggregate(&results))
    }

    /// @ai:intent Statistics for one model's records
    /// @ai:pre records is non-empty
    /// @ai:effects pure
    fn calculate_model(&self, records: &[&RunResult]) -> AggregatedMetrics {
        let total_runs = records.len() as u32;
        let successful: Vec<&RunResult> = records.iter().copied().filter(|r| !r.is_error()).collect();

        if successful.is_empty() {
            return AggregatedMetrics::unavailable(total_runs);
        }

        let accuracies: Vec<f64> = match self.mode {
            AggregationMode::IncludeErrors => records.iter().map(|r| r.accuracy).collect(),
            AggregationMode::SuccessfulOnly => successful.iter().map(|r| r.accuracy).collect(),
        };

        let latencies: Vec<f64> = records
            .iter()
            .map(|r| r.latency)
            .filter(|latency| *latency > 0.0)
            .collect();

        let throughputs = successful.iter().filter_map(|r| match r.output_tokens {
            Some(tokens) if tokens > 0 && r.latency > 0.0 => Some(tokens as f64 / r.latency),
            _ => None,
        });

        let error_count = total_runs - successful.len() as u32;

        AggregatedMetrics {
            status: ModelStatus::Available,
            avg_accuracy: average(accuracies.iter().copied()),
            std_accuracy: sample_std_dev(&accuracies),
            avg_latency: average(latencies.iter().copied()),
            std_latency: sample_std_dev(&latencies),
            min_latency: latencies.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max_latency: latencies.iter().copied().reduce(f64::max).unwrap_or(0.0),
            tokens_per_second: average(throughputs),
            error_rate: error_count as f64 / total_runs as f64,
            total_runs,
            successful_runs: successful.len() as u32,
        }
    }

    /// @ai:intent Best available model for a metric
    /// @ai:post ties resolve to the first model in iteration order
    /// @ai:example ({a: 0.8, b: 0.9, c: 0.7}, AvgAccuracy, Maximize) -> Some("b")
    /// @ai:effects pure
    pub fn best_performer(
        metrics: &MetricsByModel,
        metric: Metric,
        direction: Direction,
    ) -> Option<String> {
        best_where(metrics, metric, direction, |_| true)
    }

    /// @ai:intent Cross-model overview
    /// @ai:effects pure
    pub fn summary_statistics(metrics: &MetricsByModel) -> SummaryStatistics {
        let available_models = metrics.values().filter(|m| m.is_available()).count();

        SummaryStatistics {
            total_models: metrics.len(),
            available_models,
            best_accuracy_model: Self::best_performer(metrics, Metric::AvgAccuracy, Direction::Maximize),
            fastest_model: best_where(metrics, Metric::AvgLatency, Direction::Minimize, |v| v > 0.0),
            highest_throughput_model: best_where(
                metrics,
                Metric::TokensPerSecond,
                Direction::Maximize,
                |v| v > 0.0,
            ),
            overall_avg_accuracy: average(metrics.values().map(|m| m.avg_accuracy)),
            overall_avg_latency: average(
                metrics.values().map(|m| m.avg_latency).filter(|latency| *latency > 0.0),
            ),
        }
    }
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(AggregationMode::default())
    }
}

impl MetricsAggregatorTrait for MetricsAggregator {
    /// @ai:intent Group by model id and compute each model's statistics
    /// @ai:post one entry per distinct model_id in results
    /// @ai:effects pure
    fn aggregate(&self, results: &[RunResult]) -> MetricsByModel {
        let mut grouped: BTreeMap<&str, Vec<&RunResult>> = BTreeMap::new();

        for result in results {
            grouped.entry(result.model_id.as_str()).or_default().push(result);
        }

        grouped
            .into_iter()
            .map(|(model_id, records)| (model_id.to_string(), self.calculate_model(&records)))
            .collect()
    }
}

/// @ai:intent Best available model whose metric value passes a filter
/// @ai:effects pure
fn best_where(
    metrics: &MetricsByModel,
    metric: Metric,
    direction: Direction,
    accept: impl Fn(f64) -> bool,
) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;

    for (model_id, model) in metrics.iter().filter(|(_, m)| m.is_available()) {
        let Some(value) = metric.value(model).filter(|v| accept(*v)) else {
            continue;
        };

        let better = match best {
            None => true,
            Some((_, current)) => match direction {
                Direction::Maximize => value > current,
                Direction::Minimize => value < current,
            },
        };

        if better {
            best = Some((model_id.as_str(), value));
        }
    }

    best.map(|(model_id, _)| model_id.to_string())
}

/// @ai:intent Calculate average of an iterator of f64
/// @ai:effects pure
fn average<I: Iterator<Item = f64>>(iter: I) -> f64 {
    let (sum, count) = iter.fold((0.0, 0u32), |(s, c), v| (s + v, c + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// @ai:intent Sample standard deviation, None below two samples
/// @ai:effects pure
fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = average(values.iter().copied());
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    Some(variance.sqrt())
}
