//! Cleaning stage: raw table in, cleaned table out.
//!
//! Steps run in a fixed order and reordering them changes the output:
//! 1. Removing exact duplicate rows
//! 2. Removing IQR outliers, column by column, on every feature column
//! 3. Standardizing every feature column (all but `quality`)
//! 4. Saving the result

mod dedup;
mod outliers;
mod scaler;

pub use dedup::remove_duplicates;
pub use outliers::{IQR_MULTIPLIER, OutlierHandler};
pub use scaler::StandardScaler;

use crate::error::{PipelineError, Result, ResultExt};
use crate::table::{read_table, write_table};
use crate::types::{CleaningReport, LABEL_COLUMN};
use crate::utils::{column_names, require_column, value_distribution};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Data cleaner for the raw wine table.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean an in-memory table.
    ///
    /// Feature columns are every column except `quality`, in table order.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::MissingColumn`] if there is no `quality` column
    /// - [`PipelineError::EmptyTable`] if outlier removal leaves no rows
    /// - [`PipelineError::InvalidColumnType`] for a non-numeric feature column
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        info!("Performing data cleaning...");
        let label = require_column(&df, LABEL_COLUMN)?;
        let rows_before = df.height();

        // 1. Remove duplicate rows
        let (df, duplicates_removed) = remove_duplicates(&df)?;
        info!(
            "Removed {} duplicates, {} rows remaining",
            duplicates_removed,
            df.height()
        );

        // 2. Remove outliers, one column at a time
        let feature_columns: Vec<String> = column_names(&df)
            .into_iter()
            .filter(|name| *name != label)
            .collect();

        let rows_before_outliers = df.height();
        let (mut df, outlier_bounds) = OutlierHandler::remove_outliers(df, &feature_columns)?;
        let outliers_removed = rows_before_outliers - df.height();
        info!(
            "Removed {} outliers, {} rows remaining",
            outliers_removed,
            df.height()
        );

        if df.height() == 0 {
            return Err(PipelineError::EmptyTable {
                stage: "outlier removal".to_string(),
            });
        }

        // 3. Normalize features
        let scaler = StandardScaler::fit_transform(&mut df, &feature_columns)?;
        info!("Normalized {} features", feature_columns.len());

        let quality_distribution = value_distribution(&df, &label)?;
        debug!("Quality distribution: {:?}", quality_distribution);

        let report = CleaningReport {
            rows_before,
            duplicates_removed,
            outliers_removed,
            rows_after: df.height(),
            columns: df.width(),
            outlier_bounds,
            scaler: scaler.into_params(),
            quality_distribution,
        };

        Ok((df, report))
    }

    /// Load `input`, clean it and save the result to `output`.
    pub fn run(&self, input: &Path, separator: u8, output: &Path) -> Result<CleaningReport> {
        info!("Loading raw data from {}", input.display());
        let df = read_table(input, separator)?;
        info!("Original dataset: {} samples, {} features", df.height(), df.width());

        let (mut cleaned, report) = self
            .clean(df)
            .context(format!("Cleaning {}", input.display()))?;

        write_table(&mut cleaned, output)?;
        info!(
            "Preprocessing complete: {} samples, {} features",
            report.rows_after, report.columns
        );

        Ok(report)
    }
}
