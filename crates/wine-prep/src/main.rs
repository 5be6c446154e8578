//! CLI entry point for the wine-quality preparation pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use wine_prep::{
    CleaningReport, FeatureReport, Pipeline, PipelineConfig, PipelineResult, StatsDocument,
    VersionComparison,
};

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Deduplicate, drop outliers and standardize the raw table
    Clean,
    /// Append engineered columns to the cleaned table
    Features,
    /// Write statistics for every table version found on disk
    Stats,
    /// Run clean, features and stats in order
    Run,
}

#[derive(Parser, Debug)]
#[command(
    author = "Wine Prep Team",
    version,
    about = "Wine-quality data preparation pipeline",
    long_about = "Cleans the raw wine-quality table, engineers features and reports \
                  per-version statistics. Every stage reads and writes fixed paths \
                  relative to --root unless overridden.\n\n\
                  EXAMPLES:\n  \
                  # Run every stage with the default layout\n  \
                  wine-prep run\n\n  \
                  # Clean a semicolon-separated UCI download\n  \
                  wine-prep clean --raw winequality-red.csv --separator ';'\n\n  \
                  # Machine-readable statistics\n  \
                  wine-prep stats --json | jq .v2_clean.num_samples"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory the default data/ and reports/ paths are resolved against
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// JSON configuration file (fields absent from it keep their defaults)
    #[arg(long, global = true, conflicts_with = "root")]
    config: Option<PathBuf>,

    /// Override the raw table path
    #[arg(long, global = true)]
    raw: Option<PathBuf>,

    /// Override the cleaned table path
    #[arg(long, global = true)]
    clean: Option<PathBuf>,

    /// Override the feature-engineered table path
    #[arg(long, global = true)]
    featured: Option<PathBuf>,

    /// Override the statistics document path
    #[arg(long, global = true)]
    stats: Option<PathBuf>,

    /// Field separator of the raw table
    #[arg(long, global = true)]
    separator: Option<char>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the stage report as JSON on stdout instead of a summary
    ///
    /// Disables all logging; failures are printed as {"code", "message"}.
    #[arg(long, global = true)]
    json: bool,
}

/// Report of whichever command ran.
#[derive(Serialize)]
#[serde(untagged)]
enum CommandOutput {
    Cleaning(CleaningReport),
    Features(FeatureReport),
    Stats(StatsDocument),
    Run(Box<PipelineResult>),
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

/// Resolve the configuration: file or root first, then per-path overrides.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    let base = match (&args.config, &args.root) {
        (Some(path), _) => PipelineConfig::from_json_file(path)?,
        (None, Some(root)) => PipelineConfig::rooted_at(root),
        (None, None) => PipelineConfig::default(),
    };

    let config = PipelineConfig::builder()
        .raw_path(args.raw.clone().unwrap_or(base.raw_path))
        .clean_path(args.clean.clone().unwrap_or(base.clean_path))
        .featured_path(args.featured.clone().unwrap_or(base.featured_path))
        .stats_path(args.stats.clone().unwrap_or(base.stats_path))
        .raw_separator(args.separator.unwrap_or(base.raw_separator))
        .build()?;

    debug!("Using configuration: {:?}", config);
    Ok(config)
}

fn execute(pipeline: &Pipeline, command: Command) -> wine_prep::WinePrepResult<CommandOutput> {
    Ok(match command {
        Command::Clean => CommandOutput::Cleaning(pipeline.clean()?),
        Command::Features => CommandOutput::Features(pipeline.engineer_features()?),
        Command::Stats => CommandOutput::Stats(pipeline.report_stats()?),
        Command::Run => CommandOutput::Run(Box::new(pipeline.run()?)),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (disabled if --json is set)
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::new(config);

    match execute(&pipeline, args.command) {
        Ok(output) if args.json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Ok(output) => {
            print_summary(&output);
            Ok(())
        }
        Err(e) if args.json => {
            println!("{}", serde_json::to_string_pretty(&e)?);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Human-readable summaries (stdout, independent of log level)
// ============================================================================

fn print_summary(output: &CommandOutput) {
    match output {
        CommandOutput::Cleaning(report) => print_cleaning(report),
        CommandOutput::Features(report) => print_features(report),
        CommandOutput::Stats(document) => print_stats(document),
        CommandOutput::Run(result) => {
            print_cleaning(&result.cleaning);
            print_features(&result.features);
            print_stats(&result.stats);
        }
    }
}

fn print_cleaning(report: &CleaningReport) {
    println!("\nCLEANING");
    println!("{}", "-".repeat(60));
    println!("  Original dataset:   {} samples", report.rows_before);
    println!("  Duplicates removed: {}", report.duplicates_removed);
    println!("  Outliers removed:   {}", report.outliers_removed);
    println!(
        "  Final dataset:      {} samples, {} features",
        report.rows_after, report.columns
    );
    println!("  Quality distribution:");
    for (quality, count) in &report.quality_distribution {
        println!("    {:>3}: {}", quality, count);
    }
}

fn print_features(report: &FeatureReport) {
    println!("\nFEATURE ENGINEERING");
    println!("{}", "-".repeat(60));
    println!(
        "  Columns: {} -> {} (+{})",
        report.columns_before,
        report.columns_after,
        report.new_columns.len()
    );
    println!(
        "{:<24} {:>8} {:>10} {:>10} {:>10} {:>10}",
        "  feature", "count", "mean", "std", "min", "max"
    );
    for s in &report.summaries {
        println!(
            "  {:<22} {:>8} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            s.column, s.count, s.mean, s.std, s.min, s.max
        );
    }
    println!(
        "  Good quality wines (quality >= 7):   {}",
        report.good_quality_count
    );
    println!(
        "  Regular quality wines (quality < 7): {}",
        report.regular_quality_count
    );
}

fn print_stats(document: &StatsDocument) {
    println!("\nSUMMARY COMPARISON");
    println!("{}", "-".repeat(60));
    println!(
        "{:<15} {:<10} {:<10} {:<12}",
        "Version", "Samples", "Features", "Size (KB)"
    );
    println!("{}", "-".repeat(60));
    for (version, stats) in document {
        println!(
            "{:<15} {:<10} {:<10} {:<12}",
            version, stats.num_samples, stats.num_features, stats.file_size_kb
        );
    }
    println!("{}", "-".repeat(60));

    for line in VersionComparison::from_stats(document).summary_lines() {
        println!("{}", line);
    }
}
