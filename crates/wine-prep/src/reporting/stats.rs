//! Per-version table statistics and the comparison between versions.

use crate::config::{VERSION_CLEAN, VERSION_FEATURES, VERSION_RAW};
use crate::error::{Result, ResultExt};
use crate::table::read_table;
use crate::types::{
    GOOD_QUALITY_COLUMN, LABEL_COLUMN, StatsDocument, VersionComparison, VersionStats,
};
use crate::utils::{
    column_names, find_column, finite_or_present, is_float_dtype, numeric_values, round2,
    value_distribution,
};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Computes and persists descriptive statistics of table versions.
///
/// Tables are read as comma separated unless a version is given its own
/// separator (the raw download may use `;`).
#[derive(Debug, Clone, Default)]
pub struct StatsReporter {
    separators: HashMap<String, u8>,
}

impl StatsReporter {
    /// Read `version` with `separator` instead of a comma.
    pub fn with_separator(mut self, version: impl Into<String>, separator: u8) -> Self {
        self.separators.insert(version.into(), separator);
        self
    }

    fn separator_for(&self, version: &str) -> u8 {
        self.separators.get(version).copied().unwrap_or(b',')
    }

    /// Statistics of the table at `path`, or `None` (with a warning) if no
    /// file exists there.
    pub fn analyze(&self, path: &Path, version: &str) -> Result<Option<VersionStats>> {
        if !path.is_file() {
            warn!("{} not found, skipping {}", path.display(), version);
            return Ok(None);
        }

        let df = read_table(path, self.separator_for(version))?;
        let file_size = fs::metadata(path)?.len();

        let mut stats = VersionStats {
            version: version.to_string(),
            num_samples: df.height(),
            num_features: df.width(),
            file_size_kb: round2(file_size as f64 / 1024.0),
            missing_values: count_missing(&df)?,
            columns: column_names(&df),
            quality_distribution: None,
            good_quality_count: None,
            regular_quality_count: None,
        };

        if let Some(label) = find_column(&df, LABEL_COLUMN) {
            stats.quality_distribution = Some(value_distribution(&df, &label)?);
        }

        if let Some(flag) = find_column(&df, GOOD_QUALITY_COLUMN) {
            let good: f64 = finite_or_present(&numeric_values(&df, &flag)?).iter().sum();
            let good = good.round() as usize;
            stats.good_quality_count = Some(good);
            stats.regular_quality_count = Some(df.height().saturating_sub(good));
        }

        debug!("{} stats: {:?}", version, stats);
        Ok(Some(stats))
    }

    /// Analyze every `(version, path)` pair whose file exists.
    ///
    /// Missing files are skipped, so the document may hold any subset of
    /// the versions. Other failures (unreadable CSV, I/O) abort.
    pub fn collect(&self, versions: &[(String, PathBuf)]) -> Result<StatsDocument> {
        let mut document = StatsDocument::new();

        for (version, path) in versions {
            info!("Analyzing {}...", version);
            let stats = self
                .analyze(path, version)
                .context(format!("Analyzing {}", version))?;

            if let Some(stats) = stats {
                info!(
                    "  Samples: {}, Features: {}, Size: {} KB, Missing values: {}",
                    stats.num_samples, stats.num_features, stats.file_size_kb, stats.missing_values
                );
                document.insert(version.clone(), stats);
            }
        }

        Ok(document)
    }

    /// Write the document as pretty-printed JSON, creating the parent
    /// directory if needed.
    pub fn write_document(document: &StatsDocument, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        info!("Statistics saved to: {}", path.display());
        Ok(())
    }

    /// Read a document previously written by [`StatsReporter::write_document`].
    pub fn read_document(path: &Path) -> Result<StatsDocument> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Collect statistics for `versions` and persist them to `output`.
    pub fn run(&self, versions: &[(String, PathBuf)], output: &Path) -> Result<StatsDocument> {
        let document = self.collect(versions)?;
        Self::write_document(&document, output)?;
        Ok(document)
    }
}

/// Null cells plus NaN cells of float columns.
fn count_missing(df: &DataFrame) -> Result<usize> {
    let mut missing = 0;
    for col in df.get_columns() {
        missing += col.null_count();
        if is_float_dtype(col.dtype()) {
            let values = numeric_values(df, col.name().as_str())?;
            missing += values
                .iter()
                .filter(|v| matches!(v, Some(x) if x.is_nan()))
                .count();
        }
    }
    Ok(missing)
}

fn percent(part: f64, whole: f64) -> Option<f64> {
    (whole != 0.0).then(|| part * 100.0 / whole)
}

impl VersionComparison {
    /// Compare the standard versions present in `document`.
    pub fn from_stats(document: &StatsDocument) -> Self {
        let raw = document.get(VERSION_RAW);
        let clean = document.get(VERSION_CLEAN);
        let featured = document.get(VERSION_FEATURES);

        let mut comparison = VersionComparison::default();

        if let (Some(raw), Some(clean)) = (raw, clean) {
            let removed = raw.num_samples.saturating_sub(clean.num_samples);
            comparison.samples_removed = Some(removed);
            comparison.samples_removed_percent = percent(removed as f64, raw.num_samples as f64);
        }

        if let (Some(clean), Some(featured)) = (clean, featured) {
            let added = featured.num_features.saturating_sub(clean.num_features);
            comparison.features_added = Some(added);
            comparison.features_added_percent =
                percent(added as f64, clean.num_features as f64);
        }

        if let Some(featured) = featured
            && let Some(good) = featured.good_quality_count
        {
            comparison.good_quality_percent =
                percent(good as f64, featured.num_samples as f64);
        }

        comparison
    }

    /// Human-readable summary, one line per comparison that could be made.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let (Some(removed), Some(pct)) = (self.samples_removed, self.samples_removed_percent) {
            lines.push(format!(
                "Data cleaning removed {} samples ({:.1}% reduction)",
                removed, pct
            ));
        }
        if let (Some(added), Some(pct)) = (self.features_added, self.features_added_percent) {
            lines.push(format!(
                "Feature engineering added {} features ({:.1}% increase)",
                added, pct
            ));
        }
        if let Some(pct) = self.good_quality_percent {
            lines.push(format!("Good quality wines: {:.1}%", pct));
        }
        lines
    }

    /// Log [`Self::summary_lines`] at info level.
    pub fn log_summary(&self) {
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }
}
