//! Error types for the imputation step.
//!
//! One `thiserror` hierarchy for the whole crate, plus a `Result` alias and
//! a small context extension so library code can annotate failures without
//! reaching for `anyhow` below the binary boundary.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the imputation step.
#[derive(Error, Debug)]
pub enum ImputeError {
    /// Output directory is missing or not a directory.
    ///
    /// Raised before anything is read or computed, so a bad destination
    /// leaves no side effects at all.
    #[error("Output directory '{0}' does not exist or is not a directory")]
    InvalidOutputDir(PathBuf),

    /// The configured imputation method has no implementation.
    #[error("Imputation method '{0}' is not implemented (supported: mean, std, median)")]
    UnsupportedMethod(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Primary-key column violates the uniqueness contract.
    #[error("Key column '{column}' in '{path}' has {violations} null or duplicate entries")]
    KeyViolation {
        column: String,
        path: PathBuf,
        violations: usize,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// YAML (de)serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ImputeError>,
    },
}

impl ImputeError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ImputeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for imputation operations.
pub type Result<T> = std::result::Result<T, ImputeError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ImputeError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ImputeError::Io(e).with_context(context))
    }
}
