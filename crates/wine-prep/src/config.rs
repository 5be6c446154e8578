//! Configuration for the wine-quality preparation pipeline.
//!
//! Every stage reads and writes files at fixed relative locations. Those
//! locations are carried here as explicit parameters, with the documented
//! paths as defaults, so callers (and tests) can re-root the whole pipeline.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the raw table produced by the downloader.
pub const DEFAULT_RAW_PATH: &str = "data/raw/wine_quality.csv";
/// Default location of the Cleaner's output.
pub const DEFAULT_CLEAN_PATH: &str = "data/processed/wine_quality_clean.csv";
/// Default location of the Feature Engineer's output.
pub const DEFAULT_FEATURED_PATH: &str = "data/features/wine_quality_featured.csv";
/// Default location of the Stats Reporter's document.
pub const DEFAULT_STATS_PATH: &str = "reports/dataset_stats.json";

/// Version name of the raw table in the statistics document.
pub const VERSION_RAW: &str = "v1_raw";
/// Version name of the cleaned table in the statistics document.
pub const VERSION_CLEAN: &str = "v2_clean";
/// Version name of the feature-engineered table in the statistics document.
pub const VERSION_FEATURES: &str = "v3_features";

/// File locations used by the pipeline stages.
///
/// Use [`PipelineConfig::builder()`] for a fluent setup, or
/// [`PipelineConfig::rooted_at`] to place every default path under one
/// directory.
///
/// # Example
///
/// ```rust,ignore
/// use wine_prep::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .base_dir("/srv/wine")
///     .raw_separator(';')
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw input table.
    /// Default: `data/raw/wine_quality.csv`
    pub raw_path: PathBuf,

    /// Cleaned table written by the Cleaner.
    /// Default: `data/processed/wine_quality_clean.csv`
    pub clean_path: PathBuf,

    /// Feature-augmented table written by the Feature Engineer.
    /// Default: `data/features/wine_quality_featured.csv`
    pub featured_path: PathBuf,

    /// Statistics document written by the Stats Reporter.
    /// Default: `reports/dataset_stats.json`
    pub stats_path: PathBuf,

    /// Field separator of the raw table. Tables written by the pipeline
    /// always use a comma.
    /// Default: `,`
    pub raw_separator: char,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_path: PathBuf::from(DEFAULT_RAW_PATH),
            clean_path: PathBuf::from(DEFAULT_CLEAN_PATH),
            featured_path: PathBuf::from(DEFAULT_FEATURED_PATH),
            stats_path: PathBuf::from(DEFAULT_STATS_PATH),
            raw_separator: ',',
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Default layout re-rooted under `dir`.
    pub fn rooted_at(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            raw_path: dir.join(DEFAULT_RAW_PATH),
            clean_path: dir.join(DEFAULT_CLEAN_PATH),
            featured_path: dir.join(DEFAULT_FEATURED_PATH),
            stats_path: dir.join(DEFAULT_STATS_PATH),
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::MissingInput(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        Ok(config)
    }

    /// Table versions known to the Stats Reporter, in pipeline order.
    pub fn versions(&self) -> Vec<(String, PathBuf)> {
        vec![
            (VERSION_RAW.to_string(), self.raw_path.clone()),
            (VERSION_CLEAN.to_string(), self.clean_path.clone()),
            (VERSION_FEATURES.to_string(), self.featured_path.clone()),
        ]
    }

    /// Raw separator as the single byte the CSV reader expects.
    pub fn raw_separator_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.raw_separator as u8
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        let paths = [
            ("raw_path", &self.raw_path),
            ("clean_path", &self.clean_path),
            ("featured_path", &self.featured_path),
            ("stats_path", &self.stats_path),
        ];
        for (field, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(ConfigValidationError::EmptyPath(field.to_string()));
            }
        }

        for (field, path) in &paths[1..] {
            if *path == &self.raw_path {
                return Err(ConfigValidationError::OverwritesRawInput(field.to_string()));
            }
        }

        if !self.raw_separator.is_ascii() || self.raw_separator == '"' {
            return Err(ConfigValidationError::InvalidSeparator(self.raw_separator));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path for '{0}' must not be empty")]
    EmptyPath(String),

    #[error("Output '{0}' points at the raw input file")]
    OverwritesRawInput(String),

    #[error("Invalid separator {0:?} (must be a single ASCII character other than '\"')")]
    InvalidSeparator(char),
}

impl From<ConfigValidationError> for PipelineError {
    fn from(err: ConfigValidationError) -> Self {
        PipelineError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    base_dir: Option<PathBuf>,
    raw_path: Option<PathBuf>,
    clean_path: Option<PathBuf>,
    featured_path: Option<PathBuf>,
    stats_path: Option<PathBuf>,
    raw_separator: Option<char>,
}

impl PipelineConfigBuilder {
    /// Re-root every path that is not set explicitly under `dir`.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Set the raw input table.
    pub fn raw_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_path = Some(path.into());
        self
    }

    /// Set the cleaned table location.
    pub fn clean_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.clean_path = Some(path.into());
        self
    }

    /// Set the feature-augmented table location.
    pub fn featured_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.featured_path = Some(path.into());
        self
    }

    /// Set the statistics document location.
    pub fn stats_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.stats_path = Some(path.into());
        self
    }

    /// Set the field separator of the raw table (the UCI download uses `;`).
    pub fn raw_separator(mut self, separator: char) -> Self {
        self.raw_separator = Some(separator);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> std::result::Result<PipelineConfig, ConfigValidationError> {
        let defaults = match &self.base_dir {
            Some(dir) => PipelineConfig::rooted_at(dir),
            None => PipelineConfig::default(),
        };

        let config = PipelineConfig {
            raw_path: self.raw_path.unwrap_or(defaults.raw_path),
            clean_path: self.clean_path.unwrap_or(defaults.clean_path),
            featured_path: self.featured_path.unwrap_or(defaults.featured_path),
            stats_path: self.stats_path.unwrap_or(defaults.stats_path),
            raw_separator: self.raw_separator.unwrap_or(defaults.raw_separator),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.raw_path, PathBuf::from("data/raw/wine_quality.csv"));
        assert_eq!(
            config.clean_path,
            PathBuf::from("data/processed/wine_quality_clean.csv")
        );
        assert_eq!(
            config.featured_path,
            PathBuf::from("data/features/wine_quality_featured.csv")
        );
        assert_eq!(config.stats_path, PathBuf::from("reports/dataset_stats.json"));
        assert_eq!(config.raw_separator, ',');
    }

    #[test]
    fn test_builder_defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_builder_base_dir_and_override() {
        let config = PipelineConfig::builder()
            .base_dir("/tmp/wine")
            .stats_path("/elsewhere/stats.json")
            .raw_separator(';')
            .build()
            .unwrap();

        assert_eq!(
            config.raw_path,
            PathBuf::from("/tmp/wine/data/raw/wine_quality.csv")
        );
        assert_eq!(config.stats_path, PathBuf::from("/elsewhere/stats.json"));
        assert_eq!(config.raw_separator_byte(), b';');
    }

    #[test]
    fn test_validation_rejects_overwriting_raw() {
        let result = PipelineConfig::builder()
            .raw_path("same.csv")
            .clean_path("same.csv")
            .build();

        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::OverwritesRawInput(field) if field == "clean_path"
        ));
    }

    #[test]
    fn test_validation_rejects_empty_path() {
        let result = PipelineConfig::builder().featured_path("").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPath(_)
        ));
    }

    #[test]
    fn test_validation_rejects_non_ascii_separator() {
        let result = PipelineConfig::builder().raw_separator('§').build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidSeparator('§')
        ));
    }

    #[test]
    fn test_versions_in_pipeline_order() {
        let names: Vec<String> = PipelineConfig::default()
            .versions()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["v1_raw", "v2_clean", "v3_features"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "raw_path": "input/red.csv", "raw_separator": ";" }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.raw_path, PathBuf::from("input/red.csv"));
        assert_eq!(config.raw_separator, ';');
        assert_eq!(config.clean_path, PathBuf::from(DEFAULT_CLEAN_PATH));
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = PipelineConfig::from_json_file("does/not/exist.json").unwrap_err();
        assert!(err.is_missing_input());
    }
}
