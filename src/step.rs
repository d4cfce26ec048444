//! The imputation step: one full run from configuration to written tables.
//!
//! Flow: validate the destination, load both tables, load the
//! configuration, resolve the method, fit fill values on the training
//! split, fill both tables, record the fill values in the configuration,
//! then persist the configuration followed by the tables. Everything up to
//! persistence is side-effect free, so any failure before it leaves the
//! filesystem exactly as it was.

use crate::error::Result;
use crate::imputers::{FittedImputer, StatisticalImputer};
use crate::io::loader::{load_table, LoadOptions};
use crate::io::writer::{ensure_output_dir, write_tables, OutputNaming, DEFAULT_NA_REP};
use crate::params::{Params, DEFAULT_PARAMS_PATH};
use chrono::Local;
use polars::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Columns this step fills, in the order they are fitted and recorded.
pub const IMPUTED_COLUMNS: [&str; 2] = ["Age", "Fare"];

/// Default destination for the imputed tables, relative to the pipeline
/// working directory.
pub const DEFAULT_OUT_DIR: &str = "data/interim";

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Training-split CSV, the sole source of statistics.
    pub train_path: PathBuf,
    /// Test-split CSV; fill values are applied to it, never derived from it.
    pub test_path: PathBuf,
    /// Existing directory receiving the imputed tables.
    pub out_dir: PathBuf,
    /// Configuration document, read and rewritten at the same path.
    pub params_path: PathBuf,
}

impl RunOptions {
    /// Options for a run with the default destination and configuration
    /// location.
    pub fn new(train_path: impl Into<PathBuf>, test_path: impl Into<PathBuf>) -> Self {
        Self {
            train_path: train_path.into(),
            test_path: test_path.into(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            params_path: PathBuf::from(DEFAULT_PARAMS_PATH),
        }
    }

    /// Override the output directory.
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Override the configuration document location.
    pub fn with_params_path(mut self, params_path: impl Into<PathBuf>) -> Self {
        self.params_path = params_path.into();
        self
    }
}

/// In-memory outcome of [`impute_tables`], before anything is persisted.
#[derive(Debug, Clone)]
pub struct ImputeOutcome {
    /// The fitted imputer: method plus resolved fill values.
    pub fitted: FittedImputer,
    /// `(column, entries filled)` for the training table, in fit order.
    pub filled_train: Vec<(String, usize)>,
    /// `(column, entries filled)` for the test table, in fit order.
    pub filled_test: Vec<(String, usize)>,
}

/// Per-column outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnFill {
    /// Column name.
    pub column: String,
    /// Fill value derived from the training split.
    pub fill_value: f64,
    /// Missing entries replaced in the training table.
    pub filled_train: usize,
    /// Missing entries replaced in the test table.
    pub filled_test: usize,
}

/// Machine-readable summary of one run (the `--json` payload).
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Timestamp the report was generated.
    pub generated_at: String,
    /// Statistic used for every fill value.
    pub method: String,
    /// Outcome per imputed column, in fit order.
    pub fills: Vec<ColumnFill>,
    /// Written tables, in train/test order.
    pub output_files: Vec<PathBuf>,
    /// Configuration document rewritten by the run.
    pub params_file: PathBuf,
}

impl StepReport {
    fn new(outcome: &ImputeOutcome, output_files: Vec<PathBuf>, params_file: PathBuf) -> Self {
        let fills = outcome
            .fitted
            .fill_values()
            .enumerate()
            .map(|(i, (column, fill_value))| ColumnFill {
                column: column.to_string(),
                fill_value,
                filled_train: outcome.filled_train.get(i).map_or(0, |(_, n)| *n),
                filled_test: outcome.filled_test.get(i).map_or(0, |(_, n)| *n),
            })
            .collect();
        Self {
            generated_at: Local::now().to_rfc3339(),
            method: outcome.fitted.method().to_string(),
            fills,
            output_files,
            params_file,
        }
    }
}

/// Fill `train` and `test` in place and record the fill values in `params`.
///
/// The statistic named by `params.imputation.method` (resolved
/// case-insensitively) is computed over [`IMPUTED_COLUMNS`] from `train`
/// alone and applied identically to both tables. `method` itself is left
/// unchanged. No file is touched; an unsupported method fails before any
/// table or configuration mutation.
pub fn impute_tables(
    train: &mut DataFrame,
    test: &mut DataFrame,
    params: &mut Params,
) -> Result<ImputeOutcome> {
    let method = params.imputation.method.parse()?;
    let imputer = StatisticalImputer::new(method);

    let fitted = imputer.fit(train, &IMPUTED_COLUMNS)?;
    let filled_train = fitted.apply(train)?;
    let filled_test = fitted.apply(test)?;

    params.imputation.age = fitted.fill_value("Age");
    params.imputation.fare = fitted.fill_value("Fare");

    Ok(ImputeOutcome {
        fitted,
        filled_train,
        filled_test,
    })
}

/// Execute the full step and return its report.
pub fn run(options: &RunOptions) -> Result<StepReport> {
    // A bad destination must abort before anything is read or computed.
    ensure_output_dir(&options.out_dir)?;

    let load_options = LoadOptions::default();
    let mut train = load_table(&options.train_path, &load_options)?;
    let mut test = load_table(&options.test_path, &load_options)?;

    let mut params = Params::load(&options.params_path)?;
    info!("Imputation method: {}", params.imputation.method);

    let outcome = impute_tables(&mut train, &mut test, &mut params)?;
    for (i, (column, fill_value)) in outcome.fitted.fill_values().enumerate() {
        info!(
            "'{}' fill value {} ({} train + {} test entries filled)",
            column,
            fill_value,
            outcome.filled_train.get(i).map_or(0, |(_, n)| *n),
            outcome.filled_test.get(i).map_or(0, |(_, n)| *n),
        );
    }

    params.save(&options.params_path)?;
    info!("Configuration updated: {}", options.params_path.display());

    let input_paths = [options.train_path.clone(), options.test_path.clone()];
    let mut tables = [train, test];
    let output_files = write_tables(
        &mut tables,
        &input_paths,
        &options.out_dir,
        &OutputNaming::nan_imputed(),
        DEFAULT_NA_REP,
    )?;

    Ok(StepReport::new(
        &outcome,
        output_files,
        options.params_path.clone(),
    ))
}
