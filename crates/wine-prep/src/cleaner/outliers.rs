//! Outlier removal using the IQR method.
//!
//! Filtering is a sequential fold over the feature columns: the quartiles of
//! column `k` are measured on the table left over after columns `0..k` were
//! filtered. Column order therefore changes which rows survive, and the
//! columns must be visited in table order to reproduce earlier outputs.

use crate::error::Result;
use crate::types::ColumnOutlierBounds;
use crate::utils::{numeric_values, quartiles};
use polars::prelude::*;
use tracing::debug;

/// Width of the accepted band around the quartiles, in IQRs.
pub const IQR_MULTIPLIER: f64 = 1.5;

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Remove rows whose value in any of `columns` falls outside
    /// `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
    ///
    /// Bounds for each column are computed on the table as filtered by every
    /// preceding column. A missing (null or NaN) cell never lies inside the
    /// bounds, so its row is dropped. Stops early once no rows remain.
    pub fn remove_outliers(
        df: DataFrame,
        columns: &[String],
    ) -> Result<(DataFrame, Vec<ColumnOutlierBounds>)> {
        let mut df = df;
        let mut bounds = Vec::with_capacity(columns.len());

        for column in columns {
            if df.height() == 0 {
                break;
            }
            let (filtered, column_bounds) = Self::filter_column(&df, column)?;
            df = filtered;
            bounds.push(column_bounds);
        }

        Ok((df, bounds))
    }

    /// One step of the fold: filter `df` on a single column.
    fn filter_column(df: &DataFrame, column: &str) -> Result<(DataFrame, ColumnOutlierBounds)> {
        let values = numeric_values(df, column)?;
        let (q1, q3) = quartiles(&values);
        let iqr = q3 - q1;

        let lower = q1 - IQR_MULTIPLIER * iqr;
        let upper = q3 + IQR_MULTIPLIER * iqr;

        // Comparisons against NaN are false, so missing cells fail the mask.
        let mask_values: Vec<bool> = values
            .iter()
            .map(|v| matches!(v, Some(val) if *val >= lower && *val <= upper))
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
        let filtered = df.filter(&mask)?;
        let rows_removed = df.height() - filtered.height();

        debug!(
            "{}: Q1={:.4} Q3={:.4} bounds=[{:.4}, {:.4}] removed {} rows",
            column, q1, q3, lower, upper, rows_removed
        );

        Ok((
            filtered,
            ColumnOutlierBounds {
                column: column.to_string(),
                q1,
                q3,
                lower,
                upper,
                rows_removed,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_remove_outliers_single_column() {
        // Q1 = 3.25, Q3 = 7.75, IQR = 4.5 -> bounds [-3.5, 14.5]
        let df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 100.0],
        ]
        .unwrap();

        let (filtered, bounds) = OutlierHandler::remove_outliers(df, &names(&["value"])).unwrap();

        assert_eq!(filtered.height(), 9);
        assert_eq!(bounds.len(), 1);
        assert!((bounds[0].q1 - 3.25).abs() < 1e-12);
        assert!((bounds[0].q3 - 7.75).abs() < 1e-12);
        assert!((bounds[0].lower + 3.5).abs() < 1e-12);
        assert!((bounds[0].upper - 14.5).abs() < 1e-12);
        assert_eq!(bounds[0].rows_removed, 1);
    }

    #[test]
    fn test_no_outliers_keeps_everything() {
        let df = df![
            "value" => [1.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();

        let (filtered, bounds) = OutlierHandler::remove_outliers(df, &names(&["value"])).unwrap();
        assert_eq!(filtered.height(), 5);
        assert_eq!(bounds[0].rows_removed, 0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        // Q1 = 0, Q3 = 1, IQR = 1 -> bounds [-1.5, 2.5]; 2.5 sits on the edge
        let df = df![
            "value" => [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 2.5],
        ]
        .unwrap();

        let (filtered, _) = OutlierHandler::remove_outliers(df, &names(&["value"])).unwrap();
        assert_eq!(filtered.height(), 8);
    }

    #[test]
    fn test_filtering_is_cumulative_across_columns() {
        // Column `a` drops the row holding 100.0. Measured on the remaining
        // rows, `b` has Q1 = 1.5, Q3 = 3.0 -> bounds [-0.75, 5.25], so its 6.0
        // is removed. Measured on the original table `b` would have
        // Q1 = 1.75, Q3 = 3.75 and keep the 6.0.
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0, 3.0, 2.0],
            "b" => [1.0, 2.0, 3.0, 2.0, 1.0, 50.0, 6.0, 3.0],
        ]
        .unwrap();

        let (filtered, bounds) =
            OutlierHandler::remove_outliers(df, &names(&["a", "b"])).unwrap();

        assert_eq!(bounds[0].rows_removed, 1);
        assert!((bounds[1].q1 - 1.5).abs() < 1e-12);
        assert!((bounds[1].q3 - 3.0).abs() < 1e-12);
        assert_eq!(bounds[1].rows_removed, 1);
        assert_eq!(filtered.height(), 6);

        let b = filtered.column("b").unwrap().f64().unwrap();
        assert!(b.into_iter().flatten().all(|v| bounds[1].contains(v)));
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let df = df![
            "value" => [Some(1.0), None, Some(2.0), Some(f64::NAN), Some(3.0)],
        ]
        .unwrap();

        let (filtered, bounds) = OutlierHandler::remove_outliers(df, &names(&["value"])).unwrap();
        assert_eq!(filtered.height(), 3);
        assert_eq!(bounds[0].rows_removed, 2);
    }

    #[test]
    fn test_all_missing_column_empties_table() {
        let df = df![
            "value" => [f64::NAN, f64::NAN],
            "other" => [1.0, 2.0],
        ]
        .unwrap();

        let (filtered, bounds) =
            OutlierHandler::remove_outliers(df, &names(&["value", "other"])).unwrap();
        assert_eq!(filtered.height(), 0);
        // folding stops once the table is empty
        assert_eq!(bounds.len(), 1);
    }

    #[test]
    fn test_non_numeric_column_is_rejected() {
        let df = df![
            "color" => ["red", "white"],
        ]
        .unwrap();

        assert!(OutlierHandler::remove_outliers(df, &names(&["color"])).is_err());
    }
}
