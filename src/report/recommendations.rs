//! @ai:module:intent Narrative summary and recommendations for configured model pairs
//! @ai:module:layer domain
//! @ai:module:public_api executive_summary, recommendations, PairVerdict
//! @ai:module:stateless true

use crate::config::ModelPair;
use crate::metrics::{AggregatedMetrics, MetricsAggregator, MetricsByModel};

/// Accuracy delta beyond which one side of a pair is preferred
pub const ACCURACY_MARGIN: f64 = 0.05;

/// Floor applied to the direct latency when computing a ratio
const MIN_LATENCY_DIVISOR: f64 = 0.1;

/// @ai:intent Outcome of comparing an orchestrated model with its direct counterpart
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairVerdict {
    /// Orchestration wins on accuracy; carries the delta and latency ratio
    PreferOrchestrated { accuracy_gain: f64, latency_ratio: f64 },
    /// Direct wins on accuracy
    PreferDirect { latency_ratio: f64 },
    /// Accuracy within the margin; pick the faster side
    NearParity { latency_ratio: f64, direct_faster: bool },
}

/// @ai:intent Compare the two sides of a pair
/// @ai:effects pure
pub fn compare_pair(orchestrated: &AggregatedMetrics, direct: &AggregatedMetrics) -> PairVerdict {
    let accuracy_delta = orchestrated.avg_accuracy - direct.avg_accuracy;
    let latency_ratio = orchestrated.avg_latency / direct.avg_latency.max(MIN_LATENCY_DIVISOR);

    if accuracy_delta > ACCURACY_MARGIN {
        PairVerdict::PreferOrchestrated {
            accuracy_gain: accuracy_delta,
            latency_ratio,
        }
    } else if accuracy_delta < -ACCURACY_MARGIN {
        PairVerdict::PreferDirect { latency_ratio }
    } else {
        PairVerdict::NearParity {
            latency_ratio,
            direct_faster: direct.avg_latency < orchestrated.avg_latency,
        }
    }
}

/// @ai:intent Both sides of a pair when present and available
/// @ai:effects pure
fn available_pair<'a>(
    metrics: &'a MetricsByModel,
    pair: &ModelPair,
) -> Option<(&'a AggregatedMetrics, &'a AggregatedMetrics)> {
    let orchestrated = metrics.get(&pair.orchestrated).filter(|m| m.is_available())?;
    let direct = metrics.get(&pair.direct).filter(|m| m.is_available())?;
    Some((orchestrated, direct))
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// @ai:intent Bullet-point summary of the whole comparison
/// @ai:effects pure
pub fn executive_summary(metrics: &MetricsByModel, pairs: &[ModelPair]) -> String {
    let summary = MetricsAggregator::summary_statistics(metrics);
    let mut points = vec![format!(
        "- Tested **{}** model configurations, **{}** were available",
        summary.total_models, summary.available_models
    )];

    if let Some(model_id) = &summary.best_accuracy_model {
        points.push(format!(
            "- **Best accuracy**: {} ({})",
            model_id,
            percent(metrics[model_id].avg_accuracy)
        ));
    }

    if let Some(model_id) = &summary.fastest_model {
        points.push(format!(
            "- **Fastest response**: {} ({:.2}s average)",
            model_id, metrics[model_id].avg_latency
        ));
    }

    if let Some(model_id) = &summary.highest_throughput_model {
        points.push(format!(
            "- **Highest throughput**: {} ({:.1} tokens/s)",
            model_id, metrics[model_id].tokens_per_second
        ));
    }

    let unavailable: Vec<&str> = metrics
        .iter()
        .filter(|(_, m)| !m.is_available())
        .map(|(id, _)| id.as_str())
        .collect();
    if !unavailable.is_empty() {
        points.push(format!("- **Unavailable models**: {}", unavailable.join(", ")));
    }

    for pair in pairs {
        let Some((orchestrated, direct)) = available_pair(metrics, pair) else {
            continue;
        };

        let accuracy_delta = orchestrated.avg_accuracy - direct.avg_accuracy;
        let latency_delta = orchestrated.avg_latency - direct.avg_latency;

        if accuracy_delta > 0.0 {
            points.push(format!(
                "- **{} improvement over {}**: +{} accuracy (but {:+.1}s latency)",
                pair.orchestrated,
                pair.direct,
                percent(accuracy_delta),
                latency_delta
            ));
        } else {
            points.push(format!(
                "- **{} advantage over {}**: {} accuracy difference, {:+.1}s latency",
                pair.direct,
                pair.orchestrated,
                percent(-accuracy_delta),
                -latency_delta
            ));
        }
    }

    points.join("\n")
}

/// @ai:intent Recommendations section body
/// @ai:post always ends with the general recommendations
/// @ai:effects pure
pub fn recommendations(metrics: &MetricsByModel, pairs: &[ModelPair]) -> String {
    let mut lines = Vec::new();

    for pair in pairs {
        let Some((orchestrated, direct)) = available_pair(metrics, pair) else {
            continue;
        };

        lines.push(format!("### {} vs {}\n", pair.orchestrated, pair.direct));

        match compare_pair(orchestrated, direct) {
            PairVerdict::PreferOrchestrated {
                accuracy_gain,
                latency_ratio,
            } => {
                lines.push(format!(
                    "- **Use {}** for complex tasks requiring highest accuracy (+{} accuracy gain)",
                    pair.orchestrated,
                    percent(accuracy_gain)
                ));
                lines.push(format!(
                    "- Be aware of latency trade-off ({:.1}x slower)",
                    latency_ratio
                ));
            }
            PairVerdict::PreferDirect { latency_ratio } => {
                lines.push(format!(
                    "- **Use {}** for better overall performance",
                    pair.direct
                ));
                lines.push(format!(
                    "- {} provides better accuracy; {} takes {:.1}x as long",
                    pair.direct, pair.orchestrated, latency_ratio
                ));
            }
            PairVerdict::NearParity {
                latency_ratio,
                direct_faster,
            } => {
                if direct_faster {
                    let speedup = if latency_ratio > 1.0 {
                        format!("{:.1}x faster", latency_ratio)
                    } else {
                        "lower latency".to_string()
                    };
                    lines.push(format!(
                        "- **Use {}** for most tasks (similar accuracy, {})",
                        pair.direct, speedup
                    ));
                    lines.push(format!(
                        "- Consider {} only for tasks requiring multiple perspectives",
                        pair.orchestrated
                    ));
                } else {
                    lines.push(format!(
                        "- **Use {}** for most tasks (similar accuracy, no latency penalty)",
                        pair.orchestrated
                    ));
                }
            }
        }
    }

    let unavailable: Vec<&str> = metrics
        .iter()
        .filter(|(_, m)| !m.is_available())
        .map(|(id, _)| id.as_str())
        .collect();

    if !unavailable.is_empty() {
        lines.push("\n### Model Setup".to_string());
        for model_id in unavailable {
            lines.push(format!(
                "- **{}** was unavailable during testing; check that its backend is running and reachable (for local daemons, pull the model first)",
                model_id
            ));
        }
    }

    lines.push("\n### General Recommendations".to_string());
    lines.push(
        "- For **production use**: Choose based on latency requirements vs accuracy needs"
            .to_string(),
    );
    lines.push(
        "- For **development**: Prefer the fastest configuration with acceptable accuracy"
            .to_string(),
    );
    lines.push(
        "- For **complex reasoning**: Orchestrated configurations may provide marginal improvements"
            .to_string(),
    );

    lines.join("\n")
}
