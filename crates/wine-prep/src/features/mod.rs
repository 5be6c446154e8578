//! Feature engineering stage: cleaned table in, augmented table out.
//!
//! Six columns are appended, in this order:
//!
//! | column                 | formula                                                  |
//! |------------------------|----------------------------------------------------------|
//! | `total_acidity`        | `fixed_acidity + volatile_acidity`                       |
//! | `alcohol_to_density`   | `alcohol / density`                                      |
//! | `sulphates_to_alcohol` | `sulphates / alcohol`                                    |
//! | `acidity_ratio`        | `fixed_acidity / (volatile_acidity + 0.001)`             |
//! | `free_to_total_sulfur` | `free_sulfur_dioxide / (total_sulfur_dioxide + 0.001)`   |
//! | `is_good_quality`      | `1 if quality >= 7 else 0`                               |
//!
//! Only the last two ratios carry the `0.001` guard. `alcohol_to_density` and
//! `sulphates_to_alcohol` divide as-is, so a zero divisor yields an infinite
//! or NaN value that is written out unchanged.

use crate::error::{PipelineError, Result, ResultExt};
use crate::table::{read_pipeline_table, write_table};
use crate::types::{FeatureReport, FeatureSummary, GOOD_QUALITY_COLUMN, LABEL_COLUMN};
use crate::utils::{
    finite_or_present, is_numeric_dtype, mean, numeric_values, require_column, std_dev,
};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Divisor guard of the two protected ratio columns.
pub const RATIO_EPSILON: f64 = 0.001;

/// Quality at or above which a wine counts as good.
pub const GOOD_QUALITY_THRESHOLD: f64 = 7.0;

/// Names of the appended columns, in order.
pub const NEW_FEATURES: [&str; 6] = [
    "total_acidity",
    "alcohol_to_density",
    "sulphates_to_alcohol",
    "acidity_ratio",
    "free_to_total_sulfur",
    GOOD_QUALITY_COLUMN,
];

/// Source columns the formulas read. Spaces and underscores are
/// interchangeable when matching, so the UCI header names satisfy these.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "fixed_acidity",
    "volatile_acidity",
    "alcohol",
    "density",
    "sulphates",
    "free_sulfur_dioxide",
    "total_sulfur_dioxide",
    LABEL_COLUMN,
];

fn float(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// Actual names of the source columns in one table.
struct SourceColumns {
    fixed_acidity: String,
    volatile_acidity: String,
    alcohol: String,
    density: String,
    sulphates: String,
    free_sulfur_dioxide: String,
    total_sulfur_dioxide: String,
    quality: String,
}

impl SourceColumns {
    /// Resolve every required column up front, so a missing or non-numeric
    /// one fails before anything is computed.
    fn resolve(df: &DataFrame) -> Result<Self> {
        let numeric = |wanted: &str| -> Result<String> {
            let name = require_column(df, wanted)?;
            let dtype = df.column(&name)?.dtype();
            if !is_numeric_dtype(dtype) {
                return Err(PipelineError::InvalidColumnType {
                    dtype: dtype.to_string(),
                    column: name,
                });
            }
            Ok(name)
        };

        Ok(Self {
            fixed_acidity: numeric(REQUIRED_COLUMNS[0])?,
            volatile_acidity: numeric(REQUIRED_COLUMNS[1])?,
            alcohol: numeric(REQUIRED_COLUMNS[2])?,
            density: numeric(REQUIRED_COLUMNS[3])?,
            sulphates: numeric(REQUIRED_COLUMNS[4])?,
            free_sulfur_dioxide: numeric(REQUIRED_COLUMNS[5])?,
            total_sulfur_dioxide: numeric(REQUIRED_COLUMNS[6])?,
            quality: numeric(REQUIRED_COLUMNS[7])?,
        })
    }

    /// Expressions for the appended columns, in [`NEW_FEATURES`] order.
    ///
    /// Arithmetic propagates nulls; a null quality is not good.
    fn expressions(&self) -> Vec<Expr> {
        let fixed = float(&self.fixed_acidity);
        let volatile = float(&self.volatile_acidity);
        let alcohol = float(&self.alcohol);

        vec![
            (fixed.clone() + volatile.clone()).alias(NEW_FEATURES[0]),
            (alcohol.clone() / float(&self.density)).alias(NEW_FEATURES[1]),
            (float(&self.sulphates) / alcohol).alias(NEW_FEATURES[2]),
            (fixed / (volatile + lit(RATIO_EPSILON))).alias(NEW_FEATURES[3]),
            (float(&self.free_sulfur_dioxide)
                / (float(&self.total_sulfur_dioxide) + lit(RATIO_EPSILON)))
            .alias(NEW_FEATURES[4]),
            when(float(&self.quality).gt_eq(lit(GOOD_QUALITY_THRESHOLD)))
                .then(lit(1i64))
                .otherwise(lit(0i64))
                .alias(GOOD_QUALITY_COLUMN),
        ]
    }
}

fn summarize(column: &str, values: &[Option<f64>]) -> FeatureSummary {
    let present = finite_or_present(values);
    FeatureSummary {
        column: column.to_string(),
        count: present.len(),
        mean: mean(&present),
        std: std_dev(&present, 1),
        min: present.iter().copied().reduce(f64::min).unwrap_or(f64::NAN),
        max: present.iter().copied().reduce(f64::max).unwrap_or(f64::NAN),
    }
}

/// Derives the engineered columns from a cleaned table.
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Append the six derived columns to `df`.
    ///
    /// Existing columns are left untouched. A column that already carries one
    /// of the new names (re-running on a featured table) is replaced.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::MissingColumn`] naming the first required source
    ///   column that is absent
    /// - [`PipelineError::InvalidColumnType`] for a non-numeric source column
    pub fn engineer(&self, df: &mut DataFrame) -> Result<FeatureReport> {
        let columns_before = df.width();
        let src = SourceColumns::resolve(df)?;

        info!("Creating new features...");
        *df = df.clone().lazy().with_columns(src.expressions()).collect()?;

        let mut summaries = Vec::with_capacity(NEW_FEATURES.len());
        for name in NEW_FEATURES {
            summaries.push(summarize(name, &numeric_values(df, name)?));
            debug!("Added {}", name);
        }

        let flags = numeric_values(df, GOOD_QUALITY_COLUMN)?;
        let good_quality_count = flags.iter().filter(|f| **f == Some(1.0)).count();

        let report = FeatureReport {
            rows: df.height(),
            columns_before,
            columns_after: df.width(),
            new_columns: NEW_FEATURES.iter().map(|s| s.to_string()).collect(),
            good_quality_count,
            regular_quality_count: df.height() - good_quality_count,
            summaries,
        };

        info!(
            "Feature engineering complete: {} -> {} columns, {} good / {} regular",
            report.columns_before,
            report.columns_after,
            report.good_quality_count,
            report.regular_quality_count
        );
        Ok(report)
    }

    /// Load the cleaned table at `input`, engineer features, save to `output`.
    pub fn run(&self, input: &Path, output: &Path) -> Result<FeatureReport> {
        info!("Loading cleaned data from {}", input.display());
        let mut df = read_pipeline_table(input)?;

        let report = self
            .engineer(&mut df)
            .context(format!("Engineering features for {}", input.display()))?;

        write_table(&mut df, output)?;
        Ok(report)
    }
}
