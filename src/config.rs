//! @ai:module:intent Configuration structs for the benchmark system
//! @ai:module:layer infrastructure
//! @ai:module:public_api BenchmarkConfig, ModelConfig, BackendConfig, RunConfig, PathConfig, FilterConfig, MetricsConfig, ReportConfig, ModelPair
//! @ai:module:stateless true

use crate::corpus::{BenchmarkTask, GroundTruth};
use crate::metrics::{AggregationMode, Metric};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// @ai:intent Main configuration for the benchmark system, loaded once at startup
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    #[serde(default)]
    pub models: Vec<ModelConfig>,
    #[serde(default)]
    pub tasks: Vec<BenchmarkTask>,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// @ai:intent One entry of the model registry
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    #[serde(flatten)]
    pub backend: BackendConfig,
}

/// @ai:intent Connection parameters for each kind of backend
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// OpenAI-compatible chat completions endpoint
    Direct {
        model: String,
        #[serde(default = "default_direct_base_url")]
        base_url: String,
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
        #[serde(default = "default_provider")]
        provider: String,
        #[serde(default = "default_direct_timeout")]
        timeout_secs: u64,
        #[serde(default = "default_rate_limit")]
        requests_per_minute: u32,
    },
    /// External multi-agent orchestrator driven as a subprocess
    Orchestrated {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
        #[serde(default = "default_agent_count")]
        agent_count: u32,
        #[serde(default = "default_orchestrator_timeout")]
        timeout_secs: u64,
    },
    /// Local inference daemon (Ollama protocol)
    Local {
        model: String,
        #[serde(default = "default_local_base_url")]
        base_url: String,
        #[serde(default = "default_probe_timeout")]
        probe_timeout_secs: u64,
        #[serde(default = "default_local_timeout")]
        timeout_secs: u64,
    },
    /// Canned response, used for dry runs
    Mock {
        response: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        latency_secs: Option<f64>,
    },
}

impl BackendConfig {
    /// @ai:intent Upstream model name, when the backend exposes one
    /// @ai:effects pure
    pub fn model_name(&self) -> Option<&str> {
        match self {
            BackendConfig::Direct { model, .. } | BackendConfig::Local { model, .. } => Some(model),
            BackendConfig::Orchestrated { model, .. } => model.as_deref(),
            BackendConfig::Mock { .. } => None,
        }
    }

    /// @ai:intent Short name of the backend kind
    /// @ai:effects pure
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Direct { .. } => "direct",
            BackendConfig::Orchestrated { .. } => "orchestrated",
            BackendConfig::Local { .. } => "local",
            BackendConfig::Mock { .. } => "mock",
        }
    }
}

/// @ai:intent Run configuration for benchmark execution
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub aggregation_mode: AggregationMode,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// @ai:intent Path configuration for input/output directories
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: PathBuf,
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
}

/// @ai:intent Filter configuration for selecting tasks and models
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    pub categories: Option<Vec<String>>,
    pub task_ids: Option<Vec<String>>,
    pub model_ids: Option<Vec<String>>,
}

/// @ai:intent Which statistics the reports show
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metric_selection")]
    pub selection: Vec<String>,
    #[serde(default = "default_chart_metric")]
    pub chart_metric: String,
}

/// @ai:intent Report-level settings
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub pairs: Vec<ModelPair>,
}

/// @ai:intent An orchestrated configuration and the direct configuration it is compared with
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPair {
    pub orchestrated: String,
    pub direct: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            tasks: default_tasks(),
            run: RunConfig::default(),
            paths: PathConfig::default(),
            metrics: MetricsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            tasks_dir: default_tasks_dir(),
            results_dir: default_results_dir(),
            analysis_dir: default_analysis_dir(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            selection: default_metric_selection(),
            chart_metric: default_chart_metric(),
        }
    }
}

fn default_direct_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_provider() -> String {
    "openrouter".to_string()
}

fn default_direct_timeout() -> u64 {
    120
}

fn default_rate_limit() -> u32 {
    60
}

fn default_agent_count() -> u32 {
    8
}

fn default_orchestrator_timeout() -> u64 {
    600
}

fn default_local_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_local_timeout() -> u64 {
    180
}

fn default_tasks_dir() -> PathBuf {
    PathBuf::from("tasks")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results/raw")
}

fn default_analysis_dir() -> PathBuf {
    PathBuf::from("results/analysis")
}

fn default_metric_selection() -> Vec<String> {
    [
        "avg_accuracy",
        "std_accuracy",
        "avg_latency",
        "min_latency",
        "max_latency",
        "tokens_per_second",
        "error_rate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_chart_metric() -> String {
    "avg_accuracy".to_string()
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            id: "kimi_k2_direct".to_string(),
            backend: BackendConfig::Direct {
                model: "moonshotai/kimi-k2-thinking".to_string(),
                base_url: default_direct_base_url(),
                api_key_env: default_api_key_env(),
                provider: default_provider(),
                timeout_secs: default_direct_timeout(),
                requests_per_minute: default_rate_limit(),
            },
        },
        ModelConfig {
            id: "kimi_k2_orchestrated".to_string(),
            backend: BackendConfig::Orchestrated {
                command: "python".to_string(),
                args: vec!["orchestrate.py".to_string(), "--silent".to_string()],
                model: Some("moonshotai/kimi-k2-thinking".to_string()),
                agent_count: default_agent_count(),
                timeout_secs: default_orchestrator_timeout(),
            },
        },
        ModelConfig {
            id: "qwen3_coder_30b".to_string(),
            backend: BackendConfig::Local {
                model: "qwen3-coder:30b".to_string(),
                base_url: default_local_base_url(),
                probe_timeout_secs: default_probe_timeout(),
                timeout_secs: default_local_timeout(),
            },
        },
    ]
}

fn default_tasks() -> Vec<BenchmarkTask> {
    vec![
        BenchmarkTask {
            id: "math_olympiad_01".to_string(),
            category: "math".to_string(),
            prompt: "How many positive integers below 100 are divisible by 3 or 5? \
                     Answer with a single number."
                .to_string(),
            has_ground_truth: true,
            ground_truth: Some(GroundTruth::Number(46.0)),
            evaluation_criteria: vec![],
        },
        BenchmarkTask {
            id: "coding_optimization_01".to_string(),
            category: "coding".to_string(),
            prompt: "Optimize a function that finds duplicate entries in a large list.".to_string(),
            has_ground_truth: false,
            ground_truth: None,
            evaluation_criteria: vec![
                "time complexity analysis".to_string(),
                "uses hash set or dictionary".to_string(),
                "handles edge cases".to_string(),
            ],
        },
    ]
}

impl BenchmarkConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Reject registries with duplicate or empty model ids
    /// @ai:effects pure
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = std::collections::HashSet::new();

        for model in &self.models {
            if model.id.trim().is_empty() {
                anyhow::bail!("model entry with an empty id");
            }
            if !seen.insert(model.id.as_str()) {
                anyhow::bail!("duplicate model id in configuration: {}", model.id);
            }
        }

        Ok(())
    }

    /// @ai:intent Pairs to contrast in recommendations
    ///            Configured pairs win; otherwise each orchestrated model is paired with
    ///            the first direct model that serves the same upstream model name
    /// @ai:effects pure
    pub fn model_pairs(&self) -> Vec<ModelPair> {
        if !self.report.pairs.is_empty() {
            return self.report.pairs.clone();
        }

        self.models
            .iter()
            .filter(|m| matches!(m.backend, BackendConfig::Orchestrated { .. }))
            .filter_map(|orchestrated| {
                let name = orchestrated.backend.model_name()?;
                self.models
                    .iter()
                    .find(|m| {
                        matches!(m.backend, BackendConfig::Direct { .. })
                            && m.backend.model_name() == Some(name)
                    })
                    .map(|direct| ModelPair {
                        orchestrated: orchestrated.id.clone(),
                        direct: direct.id.clone(),
                    })
            })
            .collect()
    }
}

impl FilterConfig {
    /// @ai:intent Check if filter matches a task
    /// @ai:effects pure
    pub fn matches(&self, category: &str, id: &str) -> bool {
        let category_match = self
            .categories
            .as_ref()
            .map(|c| c.iter().any(|cat| cat == category))
            .unwrap_or(true);

        let id_match = self
            .task_ids
            .as_ref()
            .map(|ids| ids.iter().any(|task_id| task_id == id))
            .unwrap_or(true);

        category_match && id_match
    }

    /// @ai:intent Check if filter selects a model
    /// @ai:effects pure
    pub fn matches_model(&self, model_id: &str) -> bool {
        self.model_ids
            .as_ref()
            .map(|ids| ids.iter().any(|id| id == model_id))
            .unwrap_or(true)
    }
}

impl MetricsConfig {
    /// @ai:intent Parse the selection list, ignoring names that are not metrics
    /// @ai:effects pure
    pub fn selected_metrics(&self) -> Vec<Metric> {
        self.selection
            .iter()
            .filter_map(|name| match name.parse::<Metric>() {
                Ok(metric) => Some(metric),
                Err(_) => {
                    tracing::debug!("Ignoring unknown metric in selection: {}", name);
                    None
                }
            })
            .collect()
    }

    /// @ai:intent Metric used for the ranked charts
    /// @ai:effects pure
    pub fn chart_metric(&self) -> Metric {
        self.chart_metric.parse().unwrap_or_else(|_| {
            tracing::warn!(
                "Unknown chart metric {}, falling back to avg_accuracy",
                self.chart_metric
            );
            Metric::AvgAccuracy
        })
    }
}
