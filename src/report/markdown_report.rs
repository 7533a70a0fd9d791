//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter, comparison_table
//! @ai:module:stateless true

use crate::config::ModelPair;
use crate::metrics::{Metric, MetricsByModel};
use crate::report::charts::text_bar_chart;
use crate::report::recommendations::{executive_summary, recommendations};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Write a Markdown report for aggregated metrics
    fn generate(
        &self,
        metrics: &MetricsByModel,
        pairs: &[ModelPair],
        generated_at: &str,
        output_path: &Path,
    ) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from aggregated metrics
pub struct MarkdownReporter {
    selection: Vec<Metric>,
    chart_metric: Metric,
}

impl MarkdownReporter {
    /// @ai:intent Create a reporter showing the given metrics in detail sections
    /// @ai:effects pure
    pub fn new(selection: Vec<Metric>, chart_metric: Metric) -> Self {
        Self {
            selection,
            chart_metric,
        }
    }

    /// @ai:intent Render the complete report
    /// @ai:post every model in metrics appears in the comparison table
    /// @ai:effects pure
    pub fn render(&self, metrics: &MetricsByModel, pairs: &[ModelPair], generated_at: &str) -> String {
        let mut output = String::new();

        writeln!(output, "# Benchmark Results: Model Comparison").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "**Generated**: {}", generated_at).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "---").unwrap();
        writeln!(output).unwrap();

        writeln!(output, "## Summary").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", executive_summary(metrics, pairs)).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "## Model Comparison").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", comparison_table(metrics)).unwrap();

        output.push_str(&self.detailed_metrics(metrics));

        writeln!(output, "## Performance Visualization").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", text_bar_chart(metrics, self.chart_metric)).unwrap();
        writeln!(output).unwrap();

        writeln!(output, "## Recommendations").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "{}", recommendations(metrics, pairs)).unwrap();

        output
    }

    /// @ai:intent Per-model section listing the selected metrics
    /// @ai:effects pure
    fn detailed_metrics(&self, metrics: &MetricsByModel) -> String {
        let mut output = String::new();

        writeln!(output, "## Detailed Metrics").unwrap();
        writeln!(output).unwrap();

        for (model_id, model) in metrics {
            writeln!(output, "### {}", model_id).unwrap();
            writeln!(output).unwrap();
            writeln!(output, "- **status**: {}", model.status.as_str()).unwrap();

            for metric in &self.selection {
                let Some(value) = metric.value(model) else {
                    continue;
                };

                match metric {
                    Metric::TotalRuns | Metric::SuccessfulRuns => {
                        writeln!(output, "- **{}**: {}", metric, value as u64).unwrap()
                    }
                    _ => writeln!(output, "- **{}**: {:.3}", metric, value).unwrap(),
                }
            }

            writeln!(output).unwrap();
        }

        output
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Render and write the report
    /// @ai:effects fs:write
    fn generate(
        &self,
        metrics: &MetricsByModel,
        pairs: &[ModelPair],
        generated_at: &str,
        output_path: &Path,
    ) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.render(metrics, pairs, generated_at);
        std::fs::write(output_path, content)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        tracing::info!("Report saved to {}", output_path.display());
        Ok(())
    }
}

/// @ai:intent Comparison table with one row per model
/// @ai:example empty metrics -> "No data available"
/// @ai:effects pure
pub fn comparison_table(metrics: &MetricsByModel) -> String {
    if metrics.is_empty() {
        return "No data available\n".to_string();
    }

    let mut output = String::new();

    writeln!(
        output,
        "| Model | Accuracy | Latency (s) | Tokens/s | Error Rate | Status |"
    )
    .unwrap();
    writeln!(output, "|-------|----------|-------------|----------|------------|--------|").unwrap();

    for (model_id, m) in metrics {
        writeln!(
            output,
            "| {} | {:.3} | {:.2} | {:.1} | {:.1}% | {} |",
            model_id,
            m.avg_accuracy,
            m.avg_latency,
            m.tokens_per_second,
            m.error_rate * 100.0,
            m.status.as_str()
        )
        .unwrap();
    }

    output
}
