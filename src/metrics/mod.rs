//! @ai:module:intent Per-model metrics derived from stored results
//! @ai:module:layer application
//! @ai:module:public_api AggregatedMetrics, MetricsByModel, MetricsAggregator, Metric, Direction, AggregationMode, SummaryStatistics

pub mod aggregator;
pub mod types;

pub use aggregator::{MetricsAggregator, MetricsAggregatorTrait};
pub use types::{
    AggregatedMetrics, AggregationMode, Direction, Metric, MetricsByModel, ModelStatus,
    SummaryStatistics, UnknownMetric,
};
