use serde::{Deserialize, Serialize};

/// Stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Deduplication, outlier removal and scaling
    Cleaning,
    /// Derived columns and the binary label
    FeatureEngineering,
    /// Per-version statistics document
    StatsReporting,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cleaning => "Cleaning data",
            Self::FeatureEngineering => "Engineering features",
            Self::StatsReporting => "Analyzing versions",
        }
    }
}
