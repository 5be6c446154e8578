//! Integration tests for the wine-quality preparation pipeline.
//!
//! These tests drive the stages through the files they exchange, using a
//! small slice of the UCI red wine table and seeded synthetic tables.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};
use wine_prep::utils::{column_names, mean, numeric_values, std_dev};
use wine_prep::{
    DataCleaner, FeatureEngineer, LABEL_COLUMN, NEW_FEATURES, OutlierHandler, Pipeline,
    PipelineConfig, StatsReporter, read_pipeline_table, read_table, remove_duplicates,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample_path() -> PathBuf {
    fixtures_path().join("wine_sample.csv")
}

fn load_sample() -> DataFrame {
    read_table(&sample_path(), b',').expect("Failed to read fixture")
}

/// A workspace with the fixture copied to the default raw path.
fn staged_workspace() -> (TempDir, PipelineConfig) {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::rooted_at(dir.path());
    fs::create_dir_all(config.raw_path.parent().unwrap()).unwrap();
    fs::copy(sample_path(), &config.raw_path).unwrap();
    (dir, config)
}

/// Seeded table shaped like the wine data, with a few duplicated rows.
fn write_synthetic_table(path: &Path, rows: usize, seed: u64) {
    let header = "fixed acidity,volatile acidity,citric acid,residual sugar,chlorides,\
                  free sulfur dioxide,total sulfur dioxide,density,pH,sulphates,alcohol,quality";
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = vec![header.to_string()];

    for i in 0..rows {
        if i > 0 && i % 10 == 0 {
            let previous = lines[i].clone();
            lines.push(previous);
            continue;
        }
        let fields = [
            rng.gen_range(5.0..12.0),
            rng.gen_range(0.2..1.0),
            rng.gen_range(0.0..0.7),
            rng.gen_range(1.0..4.0),
            rng.gen_range(0.05..0.12),
            rng.gen_range(5.0..40.0),
            rng.gen_range(15.0..120.0),
            rng.gen_range(0.990..1.002),
            rng.gen_range(3.0..3.7),
            rng.gen_range(0.4..1.0),
            rng.gen_range(8.5..13.0),
        ];
        let quality: i64 = rng.gen_range(3..=8);
        let mut line: Vec<String> = fields.iter().map(|v| format!("{:.4}", v)).collect();
        line.push(quality.to_string());
        lines.push(line.join(","));
    }

    fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

// ============================================================================
// Cleaner
// ============================================================================

#[test]
fn test_fixture_has_two_duplicates() {
    let (deduped, removed) = remove_duplicates(&load_sample()).unwrap();

    assert_eq!(removed, 2);
    assert_eq!(deduped.height(), 23);
}

#[test]
fn test_clean_report_accounts_for_every_row() {
    let (_dir, config) = staged_workspace();

    let report = DataCleaner
        .run(&config.raw_path, b',', &config.clean_path)
        .unwrap();

    assert_eq!(report.rows_before, 25);
    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(
        report.rows_before - report.duplicates_removed - report.outliers_removed,
        report.rows_after
    );
    let per_column: usize = report.outlier_bounds.iter().map(|b| b.rows_removed).sum();
    assert_eq!(per_column, report.outliers_removed);

    let cleaned = read_pipeline_table(&config.clean_path).unwrap();
    assert_eq!(cleaned.height(), report.rows_after);
    let distributed: usize = report.quality_distribution.values().sum();
    assert_eq!(distributed, report.rows_after);
}

#[test]
fn test_surviving_rows_respect_every_bound() {
    let (deduped, _) = remove_duplicates(&load_sample()).unwrap();
    let features: Vec<String> = column_names(&deduped)
        .into_iter()
        .filter(|c| c != LABEL_COLUMN)
        .collect();

    let (filtered, bounds) = OutlierHandler::remove_outliers(deduped, &features).unwrap();

    assert_eq!(bounds.len(), features.len());
    for b in &bounds {
        for value in present(&numeric_values(&filtered, &b.column).unwrap()) {
            assert!(
                b.contains(value),
                "{} = {} outside [{}, {}]",
                b.column,
                value,
                b.lower,
                b.upper
            );
        }
    }
}

#[test]
fn test_cleaned_columns_are_standardized() {
    let (_dir, config) = staged_workspace();
    let report = DataCleaner
        .run(&config.raw_path, b',', &config.clean_path)
        .unwrap();
    let cleaned = read_pipeline_table(&config.clean_path).unwrap();

    for params in &report.scaler {
        let values = present(&numeric_values(&cleaned, &params.column).unwrap());
        if params.constant {
            assert!(values.iter().all(|v| *v == 0.0), "{}", params.column);
        } else {
            assert!(mean(&values).abs() < 1e-6, "{} mean", params.column);
            assert!((std_dev(&values, 0) - 1.0).abs() < 1e-6, "{} std", params.column);
        }
    }
}

#[test]
fn test_label_and_column_order_survive_cleaning() {
    let (_dir, config) = staged_workspace();
    DataCleaner
        .run(&config.raw_path, b',', &config.clean_path)
        .unwrap();

    let raw = load_sample();
    let cleaned = read_pipeline_table(&config.clean_path).unwrap();
    assert_eq!(column_names(&cleaned), column_names(&raw));

    let labels = present(&numeric_values(&cleaned, LABEL_COLUMN).unwrap());
    assert!(labels.iter().all(|q| (3.0..=8.0).contains(q) && q.fract() == 0.0));
}

#[test]
fn test_cleaning_is_deterministic() {
    let (_a, first) = staged_workspace();
    let (_b, second) = staged_workspace();

    DataCleaner
        .run(&first.raw_path, b',', &first.clean_path)
        .unwrap();
    DataCleaner
        .run(&second.raw_path, b',', &second.clean_path)
        .unwrap();

    assert_eq!(
        fs::read(&first.clean_path).unwrap(),
        fs::read(&second.clean_path).unwrap()
    );
}

#[test]
fn test_synthetic_table_cleaning() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("synthetic.csv");
    let clean = dir.path().join("out/clean.csv");
    write_synthetic_table(&raw, 200, 7);

    let report = DataCleaner.run(&raw, b',', &clean).unwrap();

    assert_eq!(report.rows_before, 200);
    assert_eq!(report.duplicates_removed, 19);
    assert!(report.rows_after > 0);
    assert_eq!(report.columns, 12);
}

#[test]
fn test_semicolon_raw_table() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("winequality-red.csv");
    let text = fs::read_to_string(sample_path()).unwrap().replace(',', ";");
    fs::write(&raw, text).unwrap();

    let report = DataCleaner
        .run(&raw, b';', &dir.path().join("clean.csv"))
        .unwrap();

    assert_eq!(report.duplicates_removed, 2);
    assert_eq!(report.columns, 12);
}

#[test]
fn test_clean_missing_raw_table() {
    let dir = tempdir().unwrap();
    let err = DataCleaner
        .run(
            &dir.path().join("absent.csv"),
            b',',
            &dir.path().join("clean.csv"),
        )
        .unwrap_err();

    assert!(err.is_missing_input());
    assert_eq!(err.error_code(), "MISSING_INPUT");
}

// ============================================================================
// Feature Engineer
// ============================================================================

#[test]
fn test_featured_table_extends_cleaned_table() {
    let (_dir, config) = staged_workspace();
    DataCleaner
        .run(&config.raw_path, b',', &config.clean_path)
        .unwrap();

    let report = FeatureEngineer
        .run(&config.clean_path, &config.featured_path)
        .unwrap();

    let cleaned = read_pipeline_table(&config.clean_path).unwrap();
    let featured = read_pipeline_table(&config.featured_path).unwrap();

    let mut expected = column_names(&cleaned);
    expected.extend(NEW_FEATURES.iter().map(|s| s.to_string()));
    assert_eq!(column_names(&featured), expected);
    assert_eq!(featured.height(), cleaned.height());
    assert_eq!(
        report.good_quality_count + report.regular_quality_count,
        report.rows
    );

    // Original columns are carried over unchanged.
    for name in column_names(&cleaned) {
        assert_eq!(
            numeric_values(&featured, &name).unwrap(),
            numeric_values(&cleaned, &name).unwrap(),
            "{}",
            name
        );
    }
}

#[test]
fn test_good_quality_label_matches_quality() {
    let dir = tempdir().unwrap();
    let featured = dir.path().join("featured.csv");

    FeatureEngineer.run(&sample_path(), &featured).unwrap();

    let df = read_pipeline_table(&featured).unwrap();
    let quality = numeric_values(&df, LABEL_COLUMN).unwrap();
    let flags = numeric_values(&df, "is_good_quality").unwrap();
    for (q, flag) in quality.iter().zip(&flags) {
        let expected = if q.unwrap() >= 7.0 { 1.0 } else { 0.0 };
        assert_eq!(flag.unwrap(), expected);
    }
}

#[test]
fn test_features_on_raw_scale_fixture() {
    let mut df = load_sample();

    FeatureEngineer.engineer(&mut df).unwrap();

    let total = numeric_values(&df, "total_acidity").unwrap();
    assert!((total[0].unwrap() - 8.1).abs() < 1e-9);

    let ratio = numeric_values(&df, "alcohol_to_density").unwrap();
    assert!((ratio[0].unwrap() - 9.4 / 0.9978).abs() < 1e-9);

    let sulfur = numeric_values(&df, "free_to_total_sulfur").unwrap();
    assert!((sulfur[0].unwrap() - 11.0 / 34.001).abs() < 1e-9);
}

// ============================================================================
// Stats Reporter
// ============================================================================

#[test]
fn test_stats_skip_missing_versions() {
    let (_dir, config) = staged_workspace();

    let document = StatsReporter::default()
        .run(&config.versions(), &config.stats_path)
        .unwrap();

    assert_eq!(document.keys().collect::<Vec<_>>(), vec!["v1_raw"]);
    let raw = &document["v1_raw"];
    assert_eq!(raw.num_samples, 25);
    assert_eq!(raw.num_features, 12);
    assert_eq!(raw.missing_values, 0);
    assert!(raw.good_quality_count.is_none());

    let on_disk = StatsReporter::read_document(&config.stats_path).unwrap();
    assert_eq!(on_disk, document);
}

#[test]
fn test_stats_document_keys() {
    let (_dir, config) = staged_workspace();
    Pipeline::new(config.clone()).run().unwrap();

    let text = fs::read_to_string(&config.stats_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let clean = &json["v2_clean"];
    for key in [
        "version",
        "num_samples",
        "num_features",
        "file_size_kb",
        "missing_values",
        "columns",
        "quality_distribution",
    ] {
        assert!(clean.get(key).is_some(), "missing {}", key);
    }
    assert!(clean.get("good_quality_count").is_none());
    assert!(json["v3_features"].get("good_quality_count").is_some());
    assert!(json["v3_features"].get("regular_quality_count").is_some());
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_full_pipeline_on_fixture() {
    let (_dir, config) = staged_workspace();

    let result = Pipeline::new(config.clone()).run().unwrap();

    assert_eq!(result.stats.len(), 3);
    assert_eq!(result.stats["v1_raw"].num_samples, 25);
    assert_eq!(
        result.stats["v2_clean"].num_samples,
        result.cleaning.rows_after
    );
    assert_eq!(result.stats["v3_features"].num_features, 18);
    assert_eq!(
        result.stats["v3_features"].good_quality_count,
        Some(result.features.good_quality_count)
    );
    assert_eq!(result.comparison.features_added, Some(6));
    assert_eq!(
        result.comparison.samples_removed,
        Some(25 - result.cleaning.rows_after)
    );
}

#[test]
fn test_full_pipeline_is_byte_identical_across_runs() {
    let (_a, first) = staged_workspace();
    let (_b, second) = staged_workspace();

    Pipeline::new(first.clone()).run().unwrap();
    Pipeline::new(second.clone()).run().unwrap();

    for (a, b) in [
        (&first.clean_path, &second.clean_path),
        (&first.featured_path, &second.featured_path),
    ] {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_pipeline_stops_at_first_failure() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::rooted_at(dir.path());

    let err = Pipeline::new(config.clone()).run().unwrap_err();

    assert!(err.is_missing_input());
    assert!(!config.clean_path.exists());
    assert!(!config.stats_path.exists());
}
