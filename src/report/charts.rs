//! @ai:module:intent Ranked bar charts of a metric across models
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator, text_bar_chart
//! @ai:module:stateless true

use crate::metrics::{Metric, MetricsByModel};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;

/// Width of the longest text bar
pub const BAR_WIDTH: usize = 50;
/// Label column width in text charts
pub const LABEL_WIDTH: usize = 20;

/// @ai:intent Available models having the metric, sorted descending by value
/// @ai:effects pure
pub fn ranked_values(metrics: &MetricsByModel, metric: Metric) -> Vec<(&str, f64)> {
    let mut values: Vec<(&str, f64)> = metrics
        .iter()
        .filter(|(_, m)| m.is_available())
        .filter_map(|(model_id, m)| metric.value(m).map(|v| (model_id.as_str(), v)))
        .collect();

    // stable sort keeps id order among equal values
    values.sort_by(|a, b| b.1.total_cmp(&a.1));
    values
}

/// @ai:intent Markdown section with a fenced text bar chart
/// @ai:post bars scale to BAR_WIDTH for the maximum value
/// @ai:example empty metrics -> block containing "No data available"
/// @ai:effects pure
pub fn text_bar_chart(metrics: &MetricsByModel, metric: Metric) -> String {
    let mut lines = vec![format!("### {} Comparison\n", metric.label()), "```".to_string()];
    let values = ranked_values(metrics, metric);

    match values.first() {
        None => lines.push("No data available".to_string()),
        Some(&(_, max_value)) if max_value > 0.0 => {
            for (model_id, value) in &values {
                let bar_length = ((value / max_value) * BAR_WIDTH as f64).floor().max(0.0) as usize;
                let label: String = model_id.chars().take(LABEL_WIDTH).collect();
                lines.push(format!(
                    "{:<width$} {} {:.3}",
                    label,
                    "█".repeat(bar_length),
                    value,
                    width = LABEL_WIDTH
                ));
            }
        }
        Some(_) => {}
    }

    lines.push("```".to_string());
    lines.join("\n")
}

/// @ai:intent Trait for chart image generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Render a metric bar chart to a PNG file
    fn generate(&self, metrics: &MetricsByModel, metric: Metric, output_path: &Path) -> Result<()>;
}

/// @ai:intent Renders metric bar charts as PNG images
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Draw one bar per available model
    /// @ai:effects fs:write
    fn generate(&self, metrics: &MetricsByModel, metric: Metric, output_path: &Path) -> Result<()> {
        let data = ranked_values(metrics, metric);
        let max_value = data.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let y_max = if max_value > 0.0 { max_value * 1.1 } else { 1.0 };

        let root = BitMapBackend::new(output_path, (800, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("{} by Model", metric.label()), ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..data.len().max(1) as i32, 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_labels(data.len().max(1))
            .y_desc(metric.label())
            .x_desc("Model")
            .x_label_formatter(&|x| {
                data.get(*x as usize)
                    .map(|(name, _)| name.to_string())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(data.iter().enumerate().map(|(i, (_, value))| {
            Rectangle::new([(i as i32, 0.0), (i as i32 + 1, *value)], BLUE.mix(0.7).filled())
        }))?;

        root.present()
            .with_context(|| format!("Failed to write chart {}", output_path.display()))?;
        Ok(())
    }
}
