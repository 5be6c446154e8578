//! Wine-Quality Data Preparation Library
//!
//! A small, file-mediated pipeline built on Polars that turns the raw
//! wine-quality table into a model-ready one and describes every version.
//!
//! # Overview
//!
//! Three stages run strictly in order, each reading the previous stage's
//! output from disk:
//!
//! - **Cleaner** ([`DataCleaner`]): drops exact duplicate rows, removes IQR
//!   outliers column by column, standardizes every feature column
//! - **Feature Engineer** ([`FeatureEngineer`]): appends five ratio/sum
//!   columns and the `is_good_quality` label
//! - **Stats Reporter** ([`StatsReporter`]): per-version counts, file size,
//!   missing values and label distribution, written as one JSON document
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use wine_prep::{Pipeline, PipelineConfig};
//!
//! // Defaults: data/raw/wine_quality.csv -> ... -> reports/dataset_stats.json
//! let result = Pipeline::new(PipelineConfig::default()).run()?;
//!
//! println!("Removed {} duplicates", result.cleaning.duplicates_removed);
//! println!("Removed {} outliers", result.cleaning.outliers_removed);
//! println!("Good wines: {}", result.features.good_quality_count);
//! ```
//!
//! # Running a single stage
//!
//! ```rust,ignore
//! use wine_prep::{DataCleaner, FeatureEngineer};
//! use std::path::Path;
//!
//! let report = DataCleaner.run(
//!     Path::new("data/raw/wine_quality.csv"),
//!     b',',
//!     Path::new("data/processed/wine_quality_clean.csv"),
//! )?;
//!
//! FeatureEngineer.run(
//!     Path::new("data/processed/wine_quality_clean.csv"),
//!     Path::new("data/features/wine_quality_featured.csv"),
//! )?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod features;
pub mod pipeline;
pub mod reporting;
pub mod table;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, OutlierHandler, StandardScaler, remove_duplicates};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as WinePrepResult, ResultExt};
pub use features::{FeatureEngineer, NEW_FEATURES};
pub use pipeline::{Pipeline, PipelineStage};
pub use reporting::StatsReporter;
pub use table::{read_pipeline_table, read_table, write_table};
pub use types::{
    CleaningReport, ColumnOutlierBounds, FeatureReport, FeatureSummary, GOOD_QUALITY_COLUMN,
    LABEL_COLUMN, PipelineResult, ScalerParams, StatsDocument, VersionComparison, VersionStats,
};
