//! @ai:module:intent CLI for the model benchmark harness
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Parser, Subcommand};
use model_bench::{
    config::{BenchmarkConfig, FilterConfig},
    corpus::CorpusLoader,
    metrics::{MetricsAggregator, MetricsByModel},
    report::{comparison_table, executive_summary, ReportGenerator},
    runner::{BenchmarkRunner, ClientRegistry},
    store::ResultStore,
};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = "benchmark.toml";
const DRY_RUN_RESPONSE: &str = "[DRY RUN] No model was called";

#[derive(Parser)]
#[command(name = "model-bench")]
#[command(about = "Benchmark harness comparing language-model backends on a shared task set")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every selected model against every selected task, then analyze
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter by model IDs (comma-separated)
        #[arg(long)]
        models: Option<String>,

        /// Filter by task IDs (comma-separated)
        #[arg(long)]
        tasks: Option<String>,

        /// Filter by categories (comma-separated)
        #[arg(long)]
        categories: Option<String>,

        /// Replace every backend with a canned response
        #[arg(long)]
        dry_run: bool,

        /// Only collect results, do not generate reports
        #[arg(long)]
        no_analyze: bool,
    },

    /// Aggregate stored results and generate reports
    Analyze {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory of raw result files (overrides configuration)
        #[arg(short, long)]
        results: Option<PathBuf>,

        /// Output directory for reports (overrides configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured models and tasks
    List {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Filter tasks by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Validate configuration and task definitions
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        /// Output path for configuration
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        output: PathBuf,
    },
}

struct RunArgs {
    config: Option<PathBuf>,
    models: Option<String>,
    tasks: Option<String>,
    categories: Option<String>,
    dry_run: bool,
    no_analyze: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("model_bench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            models,
            tasks,
            categories,
            dry_run,
            no_analyze,
        } => {
            run_benchmarks(RunArgs {
                config,
                models,
                tasks,
                categories,
                dry_run,
                no_analyze,
            })
            .await
        }
        Commands::Analyze {
            config,
            results,
            output,
        } => analyze(config, results, output),
        Commands::List { config, category } => list(config, category),
        Commands::Validate { config } => validate(config),
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Execute the benchmark matrix and optionally analyze it
/// @ai:effects network, fs:read, fs:write
async fn run_benchmarks(args: RunArgs) -> Result<()> {
    let config = load_or_default_config(args.config.as_deref())?;
    let filter = merge_filter(&config.run.filter, args.models, args.tasks, args.categories);

    let tasks = CorpusLoader::new().load_with_inline(&config.tasks, &config.paths.tasks_dir, &filter)?;
    if tasks.is_empty() {
        tracing::warn!("No tasks match the filter criteria");
        return Ok(());
    }
    tracing::info!("Found {} tasks to run", tasks.len());

    let mut registry = if args.dry_run || config.run.dry_run {
        tracing::info!("Running in dry-run mode");
        ClientRegistry::dry_run(&config.models, DRY_RUN_RESPONSE)
    } else {
        ClientRegistry::from_config(&config.models)?
    };
    registry.retain(|id| filter.matches_model(id));

    if registry.is_empty() {
        tracing::warn!("No models match the filter criteria");
        return Ok(());
    }

    let store = ResultStore::new(&config.paths.results_dir);
    tracing::info!("Writing results to {}", store.dir().display());

    let runner = BenchmarkRunner::new(registry, store);
    let results = runner.run_all(&tasks).await;
    let failed = results.iter().filter(|r| r.is_error()).count();

    println!();
    println!("Completed {} runs ({} failed)", results.len(), failed);

    if args.no_analyze {
        return Ok(());
    }

    analyze_with(&config, &config.paths.results_dir, &config.paths.analysis_dir)
}

/// @ai:intent Aggregate stored results and write reports
/// @ai:effects fs:read, fs:write
fn analyze(config: Option<PathBuf>, results: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config.as_deref())?;
    let results_dir = results.unwrap_or_else(|| config.paths.results_dir.clone());
    let output_dir = output.unwrap_or_else(|| config.paths.analysis_dir.clone());

    analyze_with(&config, &results_dir, &output_dir)
}

fn analyze_with(config: &BenchmarkConfig, results_dir: &Path, output_dir: &Path) -> Result<()> {
    let aggregator = MetricsAggregator::new(config.run.aggregation_mode);
    let metrics = aggregator.aggregate_store(&ResultStore::new(results_dir))?;

    if metrics.is_empty() {
        tracing::warn!("No results found in {}", results_dir.display());
        return Ok(());
    }

    let pairs = config.model_pairs();
    print_summary(&metrics, &pairs);

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let generator = ReportGenerator::new(config.metrics.selected_metrics(), config.metrics.chart_metric());
    let paths = generator.generate_all(&metrics, &pairs, output_dir, &stamp)?;

    println!("Report: {}", paths.report.display());
    println!("Data:   {}", paths.data.display());
    if let Some(chart) = &paths.chart {
        println!("Chart:  {}", chart.display());
    }

    Ok(())
}

/// @ai:intent List configured models and the tasks that would run
/// @ai:effects fs:read
fn list(config: Option<PathBuf>, category: Option<String>) -> Result<()> {
    let config = load_or_default_config(config.as_deref())?;

    let filter = FilterConfig {
        categories: category.map(|c| vec![c]),
        ..Default::default()
    };
    let tasks = CorpusLoader::new().load_with_inline(&config.tasks, &config.paths.tasks_dir, &filter)?;

    println!("Models ({}):", config.models.len());
    println!();
    println!("{:<30} {:<14} {:<30}", "ID", "Kind", "Model");
    println!("{}", "-".repeat(74));
    for model in &config.models {
        println!(
            "{:<30} {:<14} {:<30}",
            model.id,
            model.backend.kind(),
            model.backend.model_name().unwrap_or("-")
        );
    }

    println!();
    println!("Tasks ({}):", tasks.len());
    println!();
    println!("{:<30} {:<12} {:<12}", "ID", "Category", "Scoring");
    println!("{}", "-".repeat(56));
    for task in &tasks {
        let scoring = if task.has_ground_truth { "ground truth" } else { "criteria" };
        println!("{:<30} {:<12} {:<12}", task.id, task.category, scoring);
    }

    Ok(())
}

/// @ai:intent Validate configuration and task definitions
/// @ai:effects fs:read
fn validate(config: Option<PathBuf>) -> Result<()> {
    let config = load_or_default_config(config.as_deref())?;
    config.validate()?;

    let tasks = CorpusLoader::new().load_with_inline(
        &config.tasks,
        &config.paths.tasks_dir,
        &FilterConfig::default(),
    )?;

    println!("Configuration validation passed!");
    println!("Models: {}", config.models.len());
    println!("Tasks: {}", tasks.len());

    for task in &tasks {
        println!("  - {} ({})", task.id, task.category);
    }

    for pair in config.model_pairs() {
        println!("Pair: {} vs {}", pair.orchestrated, pair.direct);
    }

    Ok(())
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = BenchmarkConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<&Path>) -> Result<BenchmarkConfig> {
    match path {
        Some(p) => BenchmarkConfig::load(p),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG);

            if default_path.exists() {
                BenchmarkConfig::load(&default_path)
            } else {
                tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG);
                Ok(BenchmarkConfig::default())
            }
        }
    }
}

/// @ai:intent Overlay comma-separated CLI filters on the configured filter
/// @ai:effects pure
fn merge_filter(
    base: &FilterConfig,
    models: Option<String>,
    tasks: Option<String>,
    categories: Option<String>,
) -> FilterConfig {
    FilterConfig {
        categories: split_list(categories).or_else(|| base.categories.clone()),
        task_ids: split_list(tasks).or_else(|| base.task_ids.clone()),
        model_ids: split_list(models).or_else(|| base.model_ids.clone()),
    }
}

fn split_list(value: Option<String>) -> Option<Vec<String>> {
    value.map(|s| {
        s.split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    })
}

/// @ai:intent Print comparison table and summary to console
/// @ai:effects io
fn print_summary(metrics: &MetricsByModel, pairs: &[model_bench::config::ModelPair]) {
    println!();
    println!("Benchmark Results");
    println!("=================");
    println!();
    print!("{}", comparison_table(metrics));
    println!();
    println!("{}", executive_summary(metrics, pairs));
    println!();
}
