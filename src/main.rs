//! Command-line entry point for the imputation step.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use titanic_impute::params::DEFAULT_PARAMS_PATH;
use titanic_impute::step::{run, RunOptions, StepReport, DEFAULT_OUT_DIR};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Fill missing Age/Fare values from training-split statistics",
    long_about = "Fills missing Age and Fare values in a train/test split pair with a\n\
                  statistic (mean, std or median) computed from the training split,\n\
                  records the fill values in params.yaml, and writes the imputed\n\
                  tables as *_nan_imputed.csv.\n\n\
                  EXAMPLES:\n  \
                  # Default interim-data destination\n  \
                  titanic-impute --train data/processed/train_categorized.csv \\\n      \
                  --test data/processed/test_categorized.csv\n\n  \
                  # Explicit output directory, machine-readable summary\n  \
                  titanic-impute --train train_categorized.csv \\\n      \
                  --test test_categorized.csv -o out/ --json"
)]
struct Args {
    /// Training-split CSV file (source of the fill statistics)
    #[arg(long)]
    train: PathBuf,

    /// Test-split CSV file (fill values applied, never measured)
    #[arg(long)]
    test: PathBuf,

    /// Output directory for the imputed tables (must already exist)
    #[arg(short, long, default_value = DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Configuration document, read and rewritten in place
    ///
    /// The imputation method is read from its `imputation.method` key and
    /// the resolved fill values are written back under `imputation.Age`
    /// and `imputation.Fare`.
    #[arg(long, default_value = DEFAULT_PARAMS_PATH)]
    params: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run report as JSON to stdout instead of a summary
    ///
    /// Disables all logging; only the JSON report is written to stdout.
    #[arg(long)]
    json: bool,
}

fn init_logging(log_level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return; // No logging in JSON mode
    }

    let filter = if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Print the human-readable run summary.
///
/// Uses `println!` rather than logging: this is the primary output of a
/// successful run and must be visible regardless of log level.
fn print_summary(report: &StepReport) {
    println!();
    println!("{}", "=".repeat(72));
    println!("NAN IMPUTATION COMPLETE");
    println!("{}", "=".repeat(72));
    println!();
    println!("Method: {}", report.method);
    println!();
    for fill in &report.fills {
        println!(
            "  {:<6} fill value {:<12} ({} train + {} test entries filled)",
            fill.column, fill.fill_value, fill.filled_train, fill.filled_test
        );
    }
    println!();
    println!("Configuration updated: {}", report.params_file.display());
    for path in &report.output_files {
        println!("Table written:         {}", path.display());
    }
    println!();
    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(72));
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let options = RunOptions::new(args.train, args.test)
        .with_out_dir(args.out_dir)
        .with_params_path(args.params);

    let report = run(&options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_summary(&report);
    Ok(())
}
