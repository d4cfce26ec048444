//! Missing-value imputation step for the Titanic preprocessing pipeline.
//!
//! Fills missing `Age` and `Fare` values in a train/test split pair with a
//! statistic (mean, sample standard deviation or median) computed from the
//! training split alone, records the resolved fill values in the shared
//! `params.yaml` document, and writes the imputed tables as new CSV files.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use titanic_impute::step::{run, RunOptions};
//!
//! let options = RunOptions::new(
//!     "data/processed/train_categorized.csv",
//!     "data/processed/test_categorized.csv",
//! );
//! let report = run(&options)?;
//! for fill in &report.fills {
//!     println!("{}: {}", fill.column, fill.fill_value);
//! }
//! ```
//!
//! The statistic is always derived from the training table and applied
//! identically to both tables, so no test-split information leaks into the
//! fill values.
//!
//! # Configuration
//!
//! `params.yaml` is shared by the whole pipeline; this step reads
//! `imputation.method` and writes `imputation.Age` / `imputation.Fare`,
//! rewriting the document wholesale and leaving every other section
//! untouched:
//!
//! ```yaml
//! imputation:
//!   method: mean
//!   Age: 29.6991
//!   Fare: 32.2042
//! ```

pub mod error;
pub mod imputers;
pub mod io;
pub mod params;
pub mod step;

pub use error::{ImputeError, Result, ResultExt};
pub use imputers::{FittedImputer, ImputationMethod, StatisticalImputer};
pub use io::{LoadOptions, OutputNaming};
pub use params::{ImputationParams, Params};
pub use step::{impute_tables, run, ImputeOutcome, RunOptions, StepReport};
