//! Reports returned by each stage and the persisted statistics document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label column of the raw and cleaned tables.
pub const LABEL_COLUMN: &str = "quality";

/// Binary label derived by the Feature Engineer.
pub const GOOD_QUALITY_COLUMN: &str = "is_good_quality";

/// Statistics document: version name -> record.
///
/// This is the only interface with the chart renderer, so the key set of
/// [`VersionStats`] must stay stable.
pub type StatsDocument = BTreeMap<String, VersionStats>;

// ============================================================================
// Cleaner
// ============================================================================

/// IQR bounds of one feature column, measured on the table as it stood when
/// that column was filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOutlierBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
    pub rows_removed: usize,
}

impl ColumnOutlierBounds {
    /// Whether a value survives this column's filter.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Fitted parameters of one standardized column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation (ddof = 0).
    pub std: f64,
    /// Column had a single distinct value; it is mapped to all zeros.
    pub constant: bool,
}

/// What the Cleaner did to a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub duplicates_removed: usize,
    /// Rows dropped across all columns combined.
    pub outliers_removed: usize,
    pub rows_after: usize,
    pub columns: usize,
    /// Per-column bounds, in filtering order.
    pub outlier_bounds: Vec<ColumnOutlierBounds>,
    pub scaler: Vec<ScalerParams>,
    pub quality_distribution: BTreeMap<i64, usize>,
}

// ============================================================================
// Feature Engineer
// ============================================================================

/// count/mean/std/min/max of one derived column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1).
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// What the Feature Engineer added to a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureReport {
    pub rows: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub new_columns: Vec<String>,
    pub good_quality_count: usize,
    pub regular_quality_count: usize,
    pub summaries: Vec<FeatureSummary>,
}

// ============================================================================
// Stats Reporter
// ============================================================================

/// Descriptive statistics of one table version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionStats {
    pub version: String,
    pub num_samples: usize,
    pub num_features: usize,
    /// Source file size in KiB, rounded to 2 decimals.
    pub file_size_kb: f64,
    /// Null or NaN cells over the whole table.
    pub missing_values: usize,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_distribution: Option<BTreeMap<i64, usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good_quality_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_quality_count: Option<usize>,
}

/// How the versions differ from each other.
///
/// Each field is present only when both versions it compares were found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_removed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples_removed_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features_added_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub good_quality_percent: Option<f64>,
}

// ============================================================================
// Pipeline
// ============================================================================

/// Outcome of running every stage in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub cleaning: CleaningReport,
    pub features: FeatureReport,
    pub stats: StatsDocument,
    pub comparison: VersionComparison,
}
