//! The pipeline configuration document (`params.yaml`).
//!
//! The document is shared by every step of the pipeline; this step owns the
//! `imputation` section and nothing else. Access is load-mutate-save: the
//! whole structure is read once, updated in memory, and rewritten wholesale,
//! so unknown sections and keys round-trip untouched.

use crate::error::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Canonical location of the configuration document, relative to the
/// pipeline working directory.
pub const DEFAULT_PARAMS_PATH: &str = "params.yaml";

/// The `imputation` section of the configuration document.
///
/// `method` selects the statistic and is never rewritten; `Age` and `Fare`
/// are the resolved fill values recorded by the most recent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationParams {
    /// Statistic used to derive fill values: `mean`, `std` or `median`
    /// (case-insensitive). Anything else aborts the run.
    pub method: String,

    /// Fill value applied to missing `Age` entries.
    #[serde(rename = "Age", default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,

    /// Fill value applied to missing `Fare` entries.
    #[serde(rename = "Fare", default, skip_serializing_if = "Option::is_none")]
    pub fare: Option<f64>,

    /// Keys this step does not own, kept verbatim for the rewrite.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The full configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// The section this step reads and updates.
    pub imputation: ImputationParams,

    /// Sections owned by other pipeline steps, kept verbatim for the rewrite.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Params {
    /// Load the configuration document from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .context(format!("reading configuration '{}'", path.display()))?;
        let params: Params = serde_yaml::from_str(&text)?;
        Ok(params)
    }

    /// Rewrite the whole configuration document to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = serde_yaml::to_string(self)?;
        fs::write(path, text).context(format!("writing configuration '{}'", path.display()))?;
        Ok(())
    }
}
