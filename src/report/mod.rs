//! @ai:module:intent Report generation from aggregated metrics
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, ReportPaths, JsonReporter, MarkdownReporter, ChartGenerator

pub mod charts;
pub mod json_report;
pub mod markdown_report;
pub mod recommendations;

pub use charts::{text_bar_chart, ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait};
pub use markdown_report::{comparison_table, MarkdownReporter, MarkdownReporterTrait};
pub use recommendations::{compare_pair, executive_summary, recommendations, PairVerdict};

use crate::config::ModelPair;
use crate::metrics::{Metric, MetricsByModel};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const LATEST_REPORT: &str = "latest_report.md";
pub const LATEST_DATA: &str = "latest_data.json";

/// @ai:intent Files written by one report generation
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub report: PathBuf,
    pub data: PathBuf,
    pub chart: Option<PathBuf>,
}

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    charts: ChartGenerator,
    chart_metric: Metric,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new(selection: Vec<Metric>, chart_metric: Metric) -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(selection, chart_metric),
            charts: ChartGenerator::new(),
            chart_metric,
        }
    }

    /// @ai:intent Generate the timestamped report, data snapshot and chart, then refresh the latest copies
    /// @ai:post a chart rendering failure is logged and does not fail the call
    /// @ai:effects fs:write
    pub fn generate_all(
        &self,
        metrics: &MetricsByModel,
        pairs: &[ModelPair],
        output_dir: &Path,
        stamp: &str,
    ) -> Result<ReportPaths> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        let report = output_dir.join(format!("benchmark_report_{}.md", stamp));
        self.markdown.generate(metrics, pairs, &generated_at, &report)?;

        let data = output_dir.join(format!("benchmark_data_{}.json", stamp));
        self.json.generate(metrics, &data)?;

        let chart_path = output_dir.join(format!("chart_{}_{}.png", self.chart_metric, stamp));
        let chart = match self.charts.generate(metrics, self.chart_metric, &chart_path) {
            Ok(()) => Some(chart_path),
            Err(e) => {
                tracing::warn!("Skipping chart {}: {:#}", chart_path.display(), e);
                None
            }
        };

        refresh_latest(&report, &output_dir.join(LATEST_REPORT))?;
        refresh_latest(&data, &output_dir.join(LATEST_DATA))?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(ReportPaths {
            report,
            data,
            chart,
        })
    }
}

/// @ai:intent Replace a "latest" file with a copy of the newest output
/// @ai:effects fs:write
fn refresh_latest(source: &Path, latest: &Path) -> Result<()> {
    if latest.exists() {
        std::fs::remove_file(latest)
            .with_context(|| format!("Failed to remove {}", latest.display()))?;
    }

    std::fs::copy(source, latest).with_context(|| {
        format!("Failed to copy {} to {}", source.display(), latest.display())
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{BenchmarkTask, GroundTruth};
    use crate::metrics::{AggregationMode, MetricsAggregator};
    use crate::runner::{BenchmarkRunner, ClientRegistry, MockClient, ModelClient, Outcome};
    use crate::store::ResultStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Offline;

    #[async_trait]
    impl ModelClient for Offline {
        async fn invoke(&self, _prompt: &str) -> Outcome {
            Outcome::Failure {
                error: crate::error::MODEL_NOT_AVAILABLE.to_string(),
                latency: 0.0,
            }
        }
    }

    fn tasks() -> Vec<BenchmarkTask> {
        vec![
            BenchmarkTask {
                id: "math_01".to_string(),
                category: "math".to_string(),
                prompt: "What is 6 x 7?".to_string(),
                has_ground_truth: true,
                ground_truth: Some(GroundTruth::Number(42.0)),
                evaluation_criteria: vec![],
            },
            BenchmarkTask {
                id: "design_01".to_string(),
                category: "coding".to_string(),
                prompt: "Design a cache".to_string(),
                has_ground_truth: false,
                ground_truth: None,
                evaluation_criteria: vec!["eviction policy".to_string()],
            },
        ]
    }

    #[tokio::test]
    async fn test_pipeline_with_partial_failures() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("raw");
        let analysis_dir = temp.path().join("analysis");

        let mut registry = ClientRegistry::new();
        registry.register(
            "direct",
            Arc::new(MockClient::new("42, with an LRU eviction policy").with_latency(2.0)),
        );
        registry.register(
            "orchestrated",
            Arc::new(MockClient::new("The answer is 41").with_latency(6.0)),
        );
        registry.register("local", Arc::new(Offline));

        let runner = BenchmarkRunner::new(registry, ResultStore::new(&store_dir));
        let results = runner.run_all(&tasks()).await;
        assert_eq!(results.len(), 6);

        let metrics = MetricsAggregator::new(AggregationMode::IncludeErrors)
            .aggregate_store(&ResultStore::new(&store_dir))
            .unwrap();
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics["direct"].avg_accuracy, 1.0);
        assert!(!metrics["local"].is_available());

        let pairs = vec![ModelPair {
            orchestrated: "orchestrated".to_string(),
            direct: "direct".to_string(),
        }];
        let generator = ReportGenerator::new(Metric::ALL.to_vec(), Metric::AvgAccuracy);
        let paths = generator
            .generate_all(&metrics, &pairs, &analysis_dir, "20260119_000000")
            .unwrap();

        let report = std::fs::read_to_string(&paths.report).unwrap();
        for model in ["direct", "orchestrated", "local"] {
            assert!(report.contains(&format!("| {} |", model)));
        }
        assert!(report.contains("**Use direct**"));

        assert_eq!(
            std::fs::read_to_string(analysis_dir.join(LATEST_REPORT)).unwrap(),
            report
        );
        assert_eq!(
            std::fs::read_to_string(analysis_dir.join(LATEST_DATA)).unwrap(),
            std::fs::read_to_string(&paths.data).unwrap()
        );
    }

    #[test]
    fn test_latest_files_are_refreshed() {
        let temp = TempDir::new().unwrap();
        let generator = ReportGenerator::new(vec![Metric::AvgAccuracy], Metric::AvgAccuracy);
        let metrics = MetricsByModel::new();

        generator.generate_all(&metrics, &[], temp.path(), "first").unwrap();
        let second = generator.generate_all(&metrics, &[], temp.path(), "second").unwrap();

        assert!(temp.path().join("benchmark_report_first.md").exists());
        assert_eq!(
            std::fs::read_to_string(temp.path().join(LATEST_REPORT)).unwrap(),
            std::fs::read_to_string(&second.report).unwrap()
        );
    }
}
