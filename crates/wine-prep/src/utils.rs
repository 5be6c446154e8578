//! Shared helpers for the pipeline stages.
//!
//! Column lookup, numeric extraction and the small set of descriptive
//! statistics (quantiles, mean, population standard deviation) that the
//! stages share.

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

// =============================================================================
// Column Lookup
// =============================================================================

/// Canonical form of a column name: trimmed, lowercase, spaces as underscores.
///
/// The UCI header spells `fixed acidity` while downstream code refers to
/// `fixed_acidity`; both canonicalize to the same key.
pub fn canonical_column_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}

/// Find the actual name of the column matching `wanted`, if any.
pub fn find_column(df: &DataFrame, wanted: &str) -> Option<String> {
    let key = canonical_column_name(wanted);
    df.get_column_names()
        .into_iter()
        .find(|name| canonical_column_name(name.as_str()) == key)
        .map(|name| name.to_string())
}

/// Like [`find_column`], failing with [`PipelineError::MissingColumn`].
pub fn require_column(df: &DataFrame, wanted: &str) -> Result<String> {
    find_column(df, wanted).ok_or_else(|| PipelineError::MissingColumn(wanted.to_string()))
}

/// All column names of a frame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Numeric Extraction
// =============================================================================

/// Values of a numeric column as `f64`, nulls preserved as `None`.
///
/// Fails with [`PipelineError::InvalidColumnType`] for non-numeric columns
/// rather than silently nulling unparsable strings.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let series = col.as_materialized_series();

    if !is_numeric_dtype(series.dtype()) {
        return Err(PipelineError::InvalidColumnType {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }

    // Create float series first to avoid temporary value issue
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series.f64()?.into_iter().collect();
    Ok(values)
}

/// Present, non-NaN values only.
pub fn finite_or_present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .filter_map(|v| v.filter(|x| !x.is_nan()))
        .collect()
}

// =============================================================================
// Descriptive Statistics
// =============================================================================

/// Quantile with linear interpolation between the closest ranks.
///
/// `sorted` must be ascending and free of NaN. Position is `q * (n - 1)`,
/// matching the default of the common dataframe libraries. Returns NaN for an
/// empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// First and third quartile of the present, non-NaN values.
pub fn quartiles(values: &[Option<f64>]) -> (f64, f64) {
    let mut sorted = finite_or_present(values);
    sorted.sort_by(f64::total_cmp);
    (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// `ddof = 0` is the population deviation used for scaling; `ddof = 1` the
/// sample deviation used in summaries. Returns 0.0 when `n <= ddof`.
pub fn std_dev(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return 0.0;
    }

    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_sq / (n - ddof) as f64).sqrt()
}

/// Occurrences of each value of a label column, ascending by value.
///
/// Values are cast to `Int64`, so fractional labels truncate toward zero.
/// Null and NaN cells are not counted.
pub fn value_distribution(df: &DataFrame, name: &str) -> Result<BTreeMap<i64, usize>> {
    let col = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    if !is_numeric_dtype(col.dtype()) {
        return Err(PipelineError::InvalidColumnType {
            column: name.to_string(),
            dtype: col.dtype().to_string(),
        });
    }

    let labels = col
        .as_materialized_series()
        .cast(&DataType::Int64)?
        .drop_nulls();
    if labels.is_empty() {
        return Ok(BTreeMap::new());
    }

    let counts_df = labels.value_counts(true, false, "count".into(), false)?;
    let values = counts_df.column(labels.name().as_str())?.i64()?;
    let counts_col = counts_df.column("count")?.cast(&DataType::UInt64)?;
    let counts = counts_col.u64()?;

    Ok(values
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(value, count)| Some((value?, count? as usize)))
        .collect())
}

/// Round to two decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
