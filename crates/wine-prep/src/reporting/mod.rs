//! Version statistics.
//!
//! The Stats Reporter loads whichever table versions exist on disk and
//! writes one JSON document keyed by version name:
//!
//! ```json
//! {
//!   "v1_raw": {
//!     "version": "v1_raw",
//!     "num_samples": 1599,
//!     "num_features": 12,
//!     "file_size_kb": 98.62,
//!     "missing_values": 0,
//!     "columns": ["fixed acidity", "...", "quality"],
//!     "quality_distribution": { "3": 10, "4": 53, "5": 681, "6": 638, "7": 199, "8": 18 }
//!   },
//!   "v3_features": { "...": "...", "good_quality_count": 148, "regular_quality_count": 1031 }
//! }
//! ```
//!
//! That document is what the chart renderer reads, so its keys are fixed.
//!
//! # Example
//!
//! ```rust,ignore
//! use wine_prep::{PipelineConfig, StatsReporter, VersionComparison};
//!
//! let config = PipelineConfig::default();
//! let document = StatsReporter::default().run(&config.versions(), &config.stats_path)?;
//! VersionComparison::from_stats(&document).log_summary();
//! ```

mod stats;

pub use stats::StatsReporter;
