//! @ai:module:intent Model benchmark harness library
//! @ai:module:layer application
//! @ai:module:public_api config, corpus, error, evaluator, metrics, report, runner, store

pub mod config;
pub mod corpus;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod store;

pub use config::BenchmarkConfig;
pub use corpus::{BenchmarkTask, CorpusLoader, GroundTruth};
pub use error::ClientError;
pub use evaluator::{Evaluator, Score};
pub use metrics::{AggregatedMetrics, MetricsAggregator, MetricsByModel};
pub use report::ReportGenerator;
pub use runner::{BenchmarkRunner, ClientRegistry, ModelClient, Outcome};
pub use store::{ResultStore, RunResult};
