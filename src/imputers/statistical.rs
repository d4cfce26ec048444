//! Statistical imputation: fill values derived from a training split.
//!
//! Supports the arithmetic mean, the sample standard deviation and the
//! median. More elaborate schemes (MICE and friends) are deliberately
//! absent: the method enumeration is closed, and an unrecognized method is
//! an error rather than a fallback.

use crate::error::{ImputeError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Decimal places a fill value is rounded to before it is applied and
/// recorded in the configuration document.
const FILL_VALUE_DECIMALS: u32 = 4;

/// Statistic used to derive a column's fill value.
///
/// Parsed case-insensitively from the configuration's `imputation.method`
/// key. The enumeration is closed on purpose: an unrecognized method (for
/// example `"mice"`) becomes [`ImputeError::UnsupportedMethod`], never a
/// silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputationMethod {
    /// Arithmetic mean of the non-missing values.
    Mean,
    /// Sample standard deviation (ddof = 1) of the non-missing values.
    Std,
    /// Median of the non-missing values.
    Median,
}

impl ImputationMethod {
    /// The canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Median => "median",
        }
    }

    /// Compute this statistic over the non-missing values of `series`,
    /// rounded to [`FILL_VALUE_DECIMALS`] places.
    pub fn compute(&self, series: &Series) -> Result<f64> {
        let non_null = series.drop_nulls();
        if non_null.is_empty() {
            return Err(ImputeError::NoValidValues(series.name().to_string()));
        }
        let values = non_null.cast(&DataType::Float64)?;

        let raw = match self {
            Self::Mean => values.mean(),
            Self::Std => Some(sample_std(&values)?),
            Self::Median => values.median(),
        };

        raw.map(round_fill_value)
            .ok_or_else(|| ImputeError::NoValidValues(series.name().to_string()))
    }
}

impl FromStr for ImputationMethod {
    type Err = ImputeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "std" => Ok(Self::Std),
            "median" => Ok(Self::Median),
            _ => Err(ImputeError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ImputationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sample standard deviation (ddof = 1). Zero for fewer than two values.
fn sample_std(series: &Series) -> Result<f64> {
    let n = series.len() as f64;
    if n <= 1.0 {
        return Ok(0.0);
    }
    let mean = series.mean().unwrap_or(0.0);
    let values = series.f64()?;
    let variance: f64 = values
        .into_iter()
        .flatten()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    Ok(variance.sqrt())
}

/// Round to [`FILL_VALUE_DECIMALS`] decimal places.
fn round_fill_value(value: f64) -> f64 {
    let factor = 10f64.powi(FILL_VALUE_DECIMALS as i32);
    (value * factor).round() / factor
}

/// Derives per-column fill values from a training table and applies them to
/// any table sharing those columns.
///
/// Fitting and applying are split so the statistic provably comes from the
/// training split alone: [`StatisticalImputer::fit`] reads nothing but the
/// training table, and the resulting [`FittedImputer`] carries nothing but
/// the resolved fill values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatisticalImputer {
    method: ImputationMethod,
}

impl StatisticalImputer {
    /// Create an imputer for the given statistic.
    pub fn new(method: ImputationMethod) -> Self {
        Self { method }
    }

    /// The statistic this imputer computes.
    pub fn method(&self) -> ImputationMethod {
        self.method
    }

    /// Compute fill values for `columns` from `train` only.
    pub fn fit(&self, train: &DataFrame, columns: &[&str]) -> Result<FittedImputer> {
        let mut fills = Vec::with_capacity(columns.len());
        for &name in columns {
            let column = train
                .column(name)
                .map_err(|_| ImputeError::ColumnNotFound(name.to_string()))?;
            let value = self.method.compute(column.as_materialized_series())?;
            debug!("Fitted {} of train '{}': {}", self.method, name, value);
            fills.push((name.to_string(), value));
        }
        Ok(FittedImputer {
            method: self.method,
            fills,
        })
    }
}

/// Fill values resolved from a training split, ready to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedImputer {
    method: ImputationMethod,
    fills: Vec<(String, f64)>,
}

impl FittedImputer {
    /// The statistic the fill values were derived with.
    pub fn method(&self) -> ImputationMethod {
        self.method
    }

    /// The resolved fill value for `column`, if it was fitted.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.fills
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| *value)
    }

    /// Iterate over `(column, fill value)` pairs in fit order.
    pub fn fill_values(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fills.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Replace the missing entries of every fitted column in `df`.
    ///
    /// Returns `(column, entries filled)` pairs in fit order. A column
    /// without missing entries is left completely untouched, dtype included.
    pub fn apply(&self, df: &mut DataFrame) -> Result<Vec<(String, usize)>> {
        let mut filled = Vec::with_capacity(self.fills.len());
        for (name, value) in &self.fills {
            let column = df
                .column(name)
                .map_err(|_| ImputeError::ColumnNotFound(name.clone()))?;
            let missing = column.null_count();
            if missing == 0 {
                filled.push((name.clone(), 0));
                continue;
            }
            let replaced = fill_missing(column.as_materialized_series(), *value)?;
            df.replace(name, replaced)?;
            debug!("Filled {missing} missing '{name}' entries with {value}");
            filled.push((name.clone(), missing));
        }
        Ok(filled)
    }
}

/// Rebuild a numeric series with `fill_value` in place of every null.
fn fill_missing(series: &Series, fill_value: f64) -> Result<Series> {
    let mask = series.is_null();
    let mut values: Vec<Option<f64>> = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        if mask.get(i).unwrap_or(false) {
            values.push(Some(fill_value));
        } else {
            let value = series.get(i)?;
            values.push(Some(value.try_extract::<f64>()?));
        }
    }
    Ok(Series::new(series.name().clone(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn age_series(values: &[Option<f64>]) -> Series {
        Series::new("Age".into(), values.to_vec())
    }

    // ========================================================================
    // Method parsing
    // ========================================================================

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "MEAN".parse::<ImputationMethod>().unwrap(),
            ImputationMethod::Mean
        );
        assert_eq!(
            "Median".parse::<ImputationMethod>().unwrap(),
            ImputationMethod::Median
        );
        assert_eq!(
            " std ".parse::<ImputationMethod>().unwrap(),
            ImputationMethod::Std
        );
    }

    #[test]
    fn test_parse_rejects_unknown_methods() {
        for method in ["mice", "knn", "", "mean imputation"] {
            let error = method.parse::<ImputationMethod>().unwrap_err();
            assert!(matches!(error, ImputeError::UnsupportedMethod(_)));
            assert!(error.to_string().contains("not implemented"));
        }
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for method in [
            ImputationMethod::Mean,
            ImputationMethod::Std,
            ImputationMethod::Median,
        ] {
            assert_eq!(method.to_string().parse::<ImputationMethod>().unwrap(), method);
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    #[test]
    fn test_mean_ignores_missing_values() {
        let series = age_series(&[Some(22.0), None, Some(26.0), Some(35.0), None]);
        let value = ImputationMethod::Mean.compute(&series).unwrap();
        assert_eq!(value, 27.6667);
    }

    #[test]
    fn test_median_of_odd_count() {
        let series = Series::new("Fare".into(), vec![Some(7.25), Some(71.28), Some(8.05), None]);
        let value = ImputationMethod::Median.compute(&series).unwrap();
        assert_eq!(value, 8.05);
    }

    #[test]
    fn test_median_of_even_count_is_midpoint() {
        let series = age_series(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
        let value = ImputationMethod::Median.compute(&series).unwrap();
        assert_eq!(value, 2.5);
    }

    #[test]
    fn test_std_uses_sample_variance() {
        // Sample std of [22, 26, 35] with ddof = 1 is sqrt(133/3) = 6.6583...
        let series = age_series(&[Some(22.0), Some(26.0), Some(35.0)]);
        let value = ImputationMethod::Std.compute(&series).unwrap();
        assert_eq!(value, 6.6583);
    }

    #[test]
    fn test_std_of_single_value_is_zero() {
        let series = age_series(&[Some(41.0), None]);
        let value = ImputationMethod::Std.compute(&series).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_all_missing_column_is_an_error() {
        let series = age_series(&[None, None, None]);
        let error = ImputationMethod::Mean.compute(&series).unwrap_err();
        assert!(matches!(error, ImputeError::NoValidValues(_)));
    }

    #[test]
    fn test_integer_columns_are_accepted() {
        let series = Series::new("Age".into(), vec![Some(10i64), Some(20), None]);
        let value = ImputationMethod::Mean.compute(&series).unwrap();
        assert_eq!(value, 15.0);
    }

    #[test]
    fn test_rounding_to_four_places() {
        assert_eq!(round_fill_value(27.66666666), 27.6667);
        assert_eq!(round_fill_value(8.05), 8.05);
        assert_eq!(round_fill_value(-1.23456), -1.2346);
    }

    // ========================================================================
    // Fit and apply
    // ========================================================================

    fn sample_train() -> DataFrame {
        df! {
            "PassengerId" => [1i64, 2, 3, 4, 5],
            "Age" => [Some(22.0), None, Some(26.0), Some(35.0), None],
            "Fare" => [Some(10.0), Some(20.0), Some(30.0), Some(40.0), Some(50.0)],
        }
        .unwrap()
    }

    #[test]
    fn test_fit_reads_only_the_training_table() {
        let train = sample_train();
        let fitted = StatisticalImputer::new(ImputationMethod::Mean)
            .fit(&train, &["Age", "Fare"])
            .unwrap();

        assert_eq!(fitted.fill_value("Age"), Some(27.6667));
        assert_eq!(fitted.fill_value("Fare"), Some(30.0));
        assert_eq!(fitted.fill_value("Pclass"), None);
    }

    #[test]
    fn test_fit_fails_on_missing_column() {
        let train = sample_train();
        let error = StatisticalImputer::new(ImputationMethod::Mean)
            .fit(&train, &["Cabin"])
            .unwrap_err();
        assert!(matches!(error, ImputeError::ColumnNotFound(_)));
    }

    #[test]
    fn test_apply_fills_only_the_missing_entries() {
        let mut train = sample_train();
        let fitted = StatisticalImputer::new(ImputationMethod::Mean)
            .fit(&train, &["Age", "Fare"])
            .unwrap();
        let filled = fitted.apply(&mut train).unwrap();

        assert_eq!(filled, vec![("Age".to_string(), 2), ("Fare".to_string(), 0)]);
        let age = train.column("Age").unwrap();
        assert_eq!(age.null_count(), 0);
        assert_eq!(age.get(0).unwrap().try_extract::<f64>().unwrap(), 22.0);
        assert_eq!(age.get(1).unwrap().try_extract::<f64>().unwrap(), 27.6667);
    }

    #[test]
    fn test_apply_uses_train_statistics_on_other_tables() {
        let train = sample_train();
        let mut test = df! {
            "PassengerId" => [6i64, 7],
            "Age" => [Some(90.0), None],
            "Fare" => [None, Some(15.0)],
        }
        .unwrap();

        let fitted = StatisticalImputer::new(ImputationMethod::Mean)
            .fit(&train, &["Age", "Fare"])
            .unwrap();
        fitted.apply(&mut test).unwrap();

        let age = test.column("Age").unwrap();
        assert_eq!(age.get(1).unwrap().try_extract::<f64>().unwrap(), 27.6667);
        let fare = test.column("Fare").unwrap();
        assert_eq!(fare.get(0).unwrap().try_extract::<f64>().unwrap(), 30.0);
    }

    #[test]
    fn test_complete_columns_keep_their_dtype() {
        let mut df = df! {
            "PassengerId" => [1i64, 2, 3],
            "Age" => [Some(20.0), None, Some(40.0)],
            "Fare" => [7i64, 8, 9],
        }
        .unwrap();

        let fitted = StatisticalImputer::new(ImputationMethod::Median)
            .fit(&df.clone(), &["Age", "Fare"])
            .unwrap();
        fitted.apply(&mut df).unwrap();

        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Fare").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut df = sample_train();
        let fitted = StatisticalImputer::new(ImputationMethod::Mean)
            .fit(&df.clone(), &["Age", "Fare"])
            .unwrap();

        fitted.apply(&mut df).unwrap();
        let once = df.clone();
        let filled_again = fitted.apply(&mut df).unwrap();

        assert_eq!(filled_again, vec![("Age".to_string(), 0), ("Fare".to_string(), 0)]);
        assert!(df.equals(&once));
    }
}
