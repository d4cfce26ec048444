//! CSV loading under the pipeline's fixed parsing contract.
//!
//! Every table this step reads is comma-separated with a header row, keyed
//! by a primary-key column, and uses a literal `nan` token (besides empty
//! cells) for missing values.

use crate::error::{ImputeError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parsing contract shared by every table this step reads.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter.
    pub separator: u8,
    /// Whether the first row is a header.
    pub has_header: bool,
    /// Primary-key column; must exist, be unique and contain no nulls.
    pub index_col: String,
    /// Literal cell token treated as missing, besides empty cells.
    pub null_token: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b',',
            has_header: true,
            index_col: "PassengerId".to_string(),
            null_token: "nan".to_string(),
        }
    }
}

/// Load one table per path under a single parsing contract, in input order.
pub fn load_tables(paths: &[PathBuf], options: &LoadOptions) -> Result<Vec<DataFrame>> {
    paths.iter().map(|path| load_table(path, options)).collect()
}

/// Load a single CSV file and validate its primary-key column.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let parse_options = CsvParseOptions::default()
        .with_separator(options.separator)
        .with_null_values(Some(NullValues::AllColumnsSingle(
            options.null_token.as_str().into(),
        )));

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(options.has_header)
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("opening '{}'", path.display()))?
        .finish()
        .context(format!("parsing '{}'", path.display()))?;

    validate_key(&df, &options.index_col, path)?;
    info!(
        "Loaded '{}': {} rows x {} columns",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// The key column must exist, hold no nulls and identify each row uniquely.
fn validate_key(df: &DataFrame, column: &str, path: &Path) -> Result<()> {
    let key = df
        .column(column)
        .map_err(|_| ImputeError::ColumnNotFound(column.to_string()))?;
    let series = key.as_materialized_series();
    let nulls = series.null_count();
    let duplicates = df.height() - series.n_unique()?;
    if nulls > 0 || duplicates > 0 {
        return Err(ImputeError::KeyViolation {
            column: column.to_string(),
            path: path.to_path_buf(),
            violations: nulls + duplicates,
        });
    }
    Ok(())
}
