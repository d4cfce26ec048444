//! Imputation strategies for missing values.
//!
//! Only statistical imputation is implemented (mean, sample standard
//! deviation, median); the method set is closed and anything else is
//! rejected up front.

mod statistical;

pub use statistical::{FittedImputer, ImputationMethod, StatisticalImputer};
