//! CLI entry point for dataset profiling and model training.

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use lex_profiling::{DataProfiler, Dataset, ProfilerConfig, ProfilingReport};
use lex_training::{Pipeline, TrainingConfig, TrainingReport};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Dataset profiling and automated model training",
    long_about = "Profile a CSV dataset or train a model for one of its columns.\n\n\
                  EXAMPLES:\n  \
                  # Statistical profile written to ./outputs/sales_profile.json\n  \
                  lex-insight profile -i sales.csv\n\n  \
                  # Train a model predicting 'price'\n  \
                  lex-insight train -i sales.csv -t price -o models/\n\n  \
                  # Machine-readable report on stdout\n  \
                  lex-insight train -i sales.csv -t region --json | jq .diagnostics"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a statistical profile of a dataset
    Profile(ProfileArgs),
    /// Train a model for a target column and report its trustworthiness
    Train(TrainArgs),
}

#[derive(Args, Debug)]
struct ProfileArgs {
    /// Path to the CSV file to profile
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the report
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Number of most frequent categories to keep per column
    #[arg(long, default_value = "5")]
    top_categories: usize,

    /// Output JSON to stdout instead of writing a report file
    ///
    /// Disables all logs; only outputs the report.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct TrainArgs {
    /// Path to the CSV file to train on
    #[arg(short, long)]
    input: PathBuf,

    /// Column to predict (case-sensitive)
    #[arg(short, long)]
    target: String,

    /// Output directory for the model artifact and report
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Seed for the train/test split and forest sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Number of trees when training a random forest
    #[arg(long, default_value = "100")]
    n_estimators: usize,

    /// Output the training report as JSON to stdout
    ///
    /// Disables all logs. The model artifact is still written.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let json = match &cli.command {
        Command::Profile(args) => args.json,
        Command::Train(args) => args.json,
    };
    init_logging(&cli.log_level, cli.quiet, json);

    match &cli.command {
        Command::Profile(args) => run_profile(args),
        Command::Train(args) => run_train(args, cli.quiet),
    }
}

fn load_dataset(input: &Path) -> Result<Dataset> {
    if !input.exists() {
        return Err(anyhow!("Input file not found: {}", input.display()));
    }
    info!("Loading dataset from: {}", input.display());
    let dataset = Dataset::from_csv(input)?;
    info!(
        "Dataset loaded successfully: {} rows x {} columns",
        dataset.height(),
        dataset.width()
    );
    Ok(dataset)
}

fn ensure_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        info!("Created output directory: {}", dir.display());
    }
    Ok(())
}

fn run_profile(args: &ProfileArgs) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    let config = ProfilerConfig::builder()
        .top_categories(args.top_categories)
        .build()?;
    let report = DataProfiler::with_config(config)?.profile(&dataset);

    if let Some(reason) = &report.error {
        error!("Profiling failed: {}", reason);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    ensure_output_dir(&args.output)?;
    let report_path = args
        .output
        .join(format!("{}_profile.json", extract_file_stem(&args.input)));
    std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
    info!("Profile written to: {}", report_path.display());

    print_profile_summary(&report, &report_path);
    Ok(())
}

fn run_train(args: &TrainArgs, quiet: bool) -> Result<()> {
    let dataset = load_dataset(&args.input)?;
    let config = TrainingConfig::builder()
        .random_seed(args.seed)
        .n_estimators(args.n_estimators)
        .build()?;

    let mut builder = Pipeline::builder().config(config);
    if !quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage,
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let (report, model) = pipeline
        .train(&dataset, &args.target)
        .map_err(|e| anyhow!("Training failed [{}]: {}", e.error_code(), e))?;

    ensure_output_dir(&args.output)?;
    let model_path = args.output.join(format!("{}.json", report.model_name));
    write_new(&model_path, &model.to_bytes()?)?;
    info!("Model written to: {}", model_path.display());

    let report_json = serde_json::to_string_pretty(&report)?;
    let report_path = args
        .output
        .join(format!("{}_report.json", report.model_name));
    write_new(&report_path, report_json.as_bytes())?;
    info!("Report written to: {}", report_path.display());

    if args.json {
        println!("{}", report_json);
        return Ok(());
    }

    print_training_summary(&report, &model_path);
    Ok(())
}

/// Write an artifact, refusing to replace an existing file.
fn write_new(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Refusing to overwrite {}", path.display()))?;
    file.write_all(bytes)?;
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

/// Print a human-readable summary of a profile.
///
/// Uses `println!` so the summary shows regardless of log level.
fn print_profile_summary(report: &ProfilingReport, report_path: &Path) {
    println!();
    println!("{}", "=".repeat(80));
    println!("PROFILE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Shape: {} rows x {} columns ({:.2} MB)",
        report.shape.0, report.shape.1, report.memory_usage_mb
    );

    if let Some(metrics) = &report.quality_metrics {
        println!(
            "Completeness: {:.1}%  Duplicate rows: {}  Columns with missing: {}",
            metrics.completeness_ratio * 100.0,
            metrics.duplicate_rows,
            metrics.columns_with_missing
        );
        println!(
            "Numeric columns: {}  Categorical columns: {}",
            metrics.numeric_columns, metrics.categorical_columns
        );
    }
    println!();

    if let Some(correlations) = &report.correlations {
        if correlations.strong_correlations.is_empty() {
            println!("No strong correlations found");
        } else {
            println!("Strong correlations:");
            for pair in &correlations.strong_correlations {
                println!(
                    "  {} ~ {}: {:+.3}",
                    pair.column1, pair.column2, pair.correlation
                );
            }
        }
        println!();
    }

    let failed: Vec<&String> = report
        .numeric_insights
        .iter()
        .filter(|(_, insight)| insight.is_failed())
        .map(|(name, _)| name)
        .chain(
            report
                .categorical_insights
                .iter()
                .filter(|(_, insight)| insight.is_failed())
                .map(|(name, _)| name),
        )
        .collect();
    if !failed.is_empty() {
        println!("Columns that could not be profiled:");
        for name in failed {
            println!("  ! {}", name);
        }
        println!();
    }

    println!("Report: {}", report_path.display());
    println!("{}", "=".repeat(80));
}

/// Print a human-readable summary of a training run.
fn print_training_summary(report: &TrainingReport, model_path: &Path) {
    let diagnostics = &report.diagnostics;

    println!();
    println!("{}", "=".repeat(80));
    println!("TRAINING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("Target: {} ({})", report.target_column, report.task);
    println!("Algorithm: {}", report.algorithm);
    println!(
        "Samples: {} ({} split), features: {}",
        report.n_samples, report.train_test_split, report.n_features
    );
    println!("{}: {}", report.score_name, report.score);
    println!(
        "Trust level: {} - {}",
        diagnostics.trust_level, diagnostics.interpretation
    );
    println!();

    println!("Feature importance:");
    for (name, weight) in report.feature_importance.iter().take(10) {
        println!("  {:<30} {:.4}", name, weight);
    }
    if report.feature_importance.len() > 10 {
        println!(
            "  ... and {} more features",
            report.feature_importance.len() - 10
        );
    }
    println!();

    let warnings: Vec<&str> = diagnostics.warnings().collect();
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("  ! {}", warning);
        }
        println!();
    }

    println!("Assumptions:");
    for assumption in &report.model_assumptions {
        println!("  - {}", assumption);
    }
    println!();

    println!("Model: {}", model_path.display());
    println!("{}", "=".repeat(80));
}
