//! Ordered driver for the three stages.
//!
//! Stages hand off through files only, so each one can also be run alone;
//! [`Pipeline::run`] simply executes them back to back.

mod stage;

pub use stage::PipelineStage;

use crate::cleaner::DataCleaner;
use crate::config::{PipelineConfig, VERSION_RAW};
use crate::error::{Result, ResultExt};
use crate::features::FeatureEngineer;
use crate::reporting::StatsReporter;
use crate::types::{CleaningReport, FeatureReport, PipelineResult, StatsDocument, VersionComparison};
use std::time::Instant;
use tracing::{error, info};

/// Runs the pipeline stages against the files named in a [`PipelineConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use wine_prep::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::new(PipelineConfig::rooted_at("/srv/wine")).run()?;
/// println!("{} rows survived cleaning", result.cleaning.rows_after);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Raw table -> cleaned table.
    pub fn clean(&self) -> Result<CleaningReport> {
        self.stage(PipelineStage::Cleaning, || {
            DataCleaner.run(
                &self.config.raw_path,
                self.config.raw_separator_byte(),
                &self.config.clean_path,
            )
        })
    }

    /// Cleaned table -> featured table.
    pub fn engineer_features(&self) -> Result<FeatureReport> {
        self.stage(PipelineStage::FeatureEngineering, || {
            FeatureEngineer.run(&self.config.clean_path, &self.config.featured_path)
        })
    }

    /// Whatever versions exist -> statistics document.
    pub fn report_stats(&self) -> Result<StatsDocument> {
        self.stage(PipelineStage::StatsReporting, || {
            let reporter = StatsReporter::default()
                .with_separator(VERSION_RAW, self.config.raw_separator_byte());
            reporter.run(&self.config.versions(), &self.config.stats_path)
        })
    }

    /// Run every stage in order, stopping at the first failure.
    pub fn run(&self) -> Result<PipelineResult> {
        let cleaning = self.clean()?;
        let features = self.engineer_features()?;
        let stats = self.report_stats()?;

        let comparison = VersionComparison::from_stats(&stats);
        comparison.log_summary();

        Ok(PipelineResult {
            cleaning,
            features,
            stats,
            comparison,
        })
    }

    fn stage<T>(&self, stage: PipelineStage, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        info!("{}...", stage.display_name());

        match f().context(stage.display_name()) {
            Ok(value) => {
                info!(
                    "{} finished in {} ms",
                    stage.display_name(),
                    start.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(e) => {
                error!("{} failed: {}", stage.display_name(), e);
                Err(e)
            }
        }
    }
}
