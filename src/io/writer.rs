//! CSV writing with the pipeline's output naming rule.
//!
//! The destination directory is part of the pipeline contract and must
//! already exist; this step never creates it. Output filenames are derived
//! from the input filenames by substring replacement, a rule kept separate
//! from the imputation logic so the naming policy can change without
//! touching it.

use crate::error::{ImputeError, Result, ResultExt};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Missing-value token written to output cells.
pub const DEFAULT_NA_REP: &str = "nan";

/// Substring-replacement rule mapping an input filename to its output
/// filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    /// Substring of the input filename to replace.
    pub replace: String,
    /// Replacement text.
    pub suffix: String,
}

impl OutputNaming {
    /// Create a naming rule from a substring and its replacement.
    pub fn new(replace: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            replace: replace.into(),
            suffix: suffix.into(),
        }
    }

    /// The step's fixed rule: `*_categorized.csv` becomes `*_nan_imputed.csv`.
    pub fn nan_imputed() -> Self {
        Self::new("_categorized.csv", "_nan_imputed.csv")
    }

    /// Output path for `input` under `out_dir`.
    ///
    /// When the input filename does not contain the `replace` substring the
    /// name is carried over unchanged, so unconventional inputs still land
    /// in the output directory instead of failing.
    pub fn output_path(&self, input: &Path, out_dir: &Path) -> PathBuf {
        let name = input.file_name().unwrap_or_default().to_string_lossy();
        out_dir.join(name.replace(&self.replace, &self.suffix))
    }
}

/// Validate that `out_dir` exists and is a directory.
///
/// Called before anything is read or computed, so a bad destination aborts
/// the run with no side effects.
pub fn ensure_output_dir(out_dir: &Path) -> Result<()> {
    if !out_dir.is_dir() {
        return Err(ImputeError::InvalidOutputDir(out_dir.to_path_buf()));
    }
    Ok(())
}

/// Write one CSV per table, named from its originating input path.
///
/// `tables` and `input_paths` correspond element-wise; the written paths
/// are returned in the same order. The header row is always included and
/// every column, the key column included, is emitted as an ordinary column.
pub fn write_tables(
    tables: &mut [DataFrame],
    input_paths: &[PathBuf],
    out_dir: &Path,
    naming: &OutputNaming,
    na_rep: &str,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(tables.len());
    for (df, input) in tables.iter_mut().zip(input_paths) {
        let path = naming.output_path(input, out_dir);
        let mut file =
            File::create(&path).context(format!("creating '{}'", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_null_value(na_rep.to_string())
            .finish(df)
            .context(format!("writing '{}'", path.display()))?;
        info!("Table saved: {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_output_name_replaces_the_categorized_suffix() {
        let naming = OutputNaming::nan_imputed();
        let path = naming.output_path(
            Path::new("data/processed/train_categorized.csv"),
            Path::new("data/interim"),
        );
        assert_eq!(path, PathBuf::from("data/interim/train_nan_imputed.csv"));
    }

    #[test]
    fn test_output_name_falls_back_to_the_input_name() {
        let naming = OutputNaming::nan_imputed();
        let path = naming.output_path(Path::new("splits/holdout.csv"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/holdout.csv"));
    }

    #[test]
    fn test_ensure_output_dir_rejects_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not_there");

        let error = ensure_output_dir(&missing).unwrap_err();
        assert!(matches!(error, ImputeError::InvalidOutputDir(_)));
        assert!(ensure_output_dir(dir.path()).is_ok());
    }

    #[test]
    fn test_ensure_output_dir_rejects_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a_file");
        fs::write(&file, "x").unwrap();

        let error = ensure_output_dir(&file).unwrap_err();
        assert!(matches!(error, ImputeError::InvalidOutputDir(_)));
    }

    #[test]
    fn test_write_tables_emits_header_key_and_nan_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let mut tables = [df! {
            "PassengerId" => [1i64, 2],
            "Age" => [Some(22.0), None],
        }
        .unwrap()];
        let inputs = [PathBuf::from("train_categorized.csv")];

        let written = write_tables(
            &mut tables,
            &inputs,
            dir.path(),
            &OutputNaming::nan_imputed(),
            DEFAULT_NA_REP,
        )
        .unwrap();

        assert_eq!(written, vec![dir.path().join("train_nan_imputed.csv")]);
        let contents = fs::read_to_string(&written[0]).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("PassengerId,Age"));
        assert_eq!(lines.next(), Some("1,22.0"));
        assert_eq!(lines.next(), Some("2,nan"));
    }
}
