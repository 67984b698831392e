//! Integration tests for dataset analysis and cleaning.
//!
//! These tests exercise the public API end to end: CSV ingestion, the
//! dataset service, the cleaning pipeline and the registry lineage.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tabular_clean::utils::round_to;
use tabular_clean::{
    Cell, CleaningOptions, CleaningPipeline, CleaningRequest, CleaningStage, ColumnKind,
    DataQualityAnalyzer, DatasetService, FillStrategy, IngestConfig, RawColumn, RawTable,
    ScalingMethod, Table, io,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> Table {
    io::read_csv_path(fixtures_path().join(filename), &IngestConfig::default())
        .expect("Failed to read CSV fixture")
}

fn table(df: DataFrame) -> Table {
    Table::from_dataframe(df).expect("Failed to build table")
}

fn service_with(file_name: &str, table: Table) -> DatasetService {
    let service = DatasetService::default();
    service
        .register_table(file_name, table)
        .expect("Failed to register table");
    service
}

fn column_text(table: &Table, name: &str) -> Vec<Option<String>> {
    table
        .column_cells(name)
        .unwrap()
        .into_iter()
        .map(|c| match c {
            Cell::Text(s) => Some(s),
            Cell::Null => None,
            other => panic!("expected text cell, got {other:?}"),
        })
        .collect()
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_duplicate_removal_scenario() {
    let raw = RawTable::new(vec![
        RawColumn::new("id", vec![Some("1"), Some("2"), Some("2"), Some("3")]),
        RawColumn::new("name", vec![Some("a"), Some("b"), Some("b"), Some("c")]),
    ]);
    let service = DatasetService::default();
    let upload = service.register_upload("people.csv", &raw).unwrap();

    let options = CleaningOptions::builder().remove_duplicates(true).build();
    let result = service.clean(&upload.file_id, &options).unwrap();

    assert_eq!(result.operations, vec!["Removed 1 duplicate rows"]);
    let preview = service.preview(&result.cleaned_file_id, Some(10)).unwrap();
    assert_eq!(
        preview.data,
        vec![
            vec![Cell::Int(1), Cell::Text("a".to_string())],
            vec![Cell::Int(2), Cell::Text("b".to_string())],
            vec![Cell::Int(3), Cell::Text("c".to_string())],
        ]
    );
}

#[test]
fn test_mean_fill_scenario() {
    let input = table(df!["score" => [Some(10i64), Some(20), None, Some(40)]].unwrap());
    let options = CleaningOptions::builder().fill_missing(FillStrategy::Mean).build();
    let outcome = tabular_clean::pipeline::clean(&input, &options).unwrap();

    let values = outcome.table.numeric_values("score").unwrap();
    assert_eq!(values.iter().filter(|v| v.is_none()).count(), 0);
    let filled = values[2].unwrap();
    assert!((filled - 70.0 / 3.0).abs() < 1e-9);
    assert_eq!(values[0], Some(10.0));
    assert_eq!(outcome.operations.len(), 1);
}

#[test]
fn test_empty_table_scores_scenario() {
    let input = load_csv("header_only.csv");
    assert_eq!(input.row_count(), 0);
    assert_eq!(input.column_count(), 2);

    let score = DataQualityAnalyzer::quality_score(&input).unwrap();
    assert_eq!(score.completeness, 100.0);
    assert_eq!(score.uniqueness, 100.0);
    assert_eq!(score.overall_score, 100.0);
}

#[test]
fn test_string_cleaning_scenario() {
    let input = table(df!["x" => [" a ", "b  ", " c "]].unwrap());
    let options = CleaningOptions::builder().clean_strings(true).build();
    let outcome = CleaningPipeline::new(options).run(&input).unwrap();

    assert_eq!(
        column_text(&outcome.table, "x"),
        vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string())]
    );
}

// ============================================================================
// CSV Fixture Tests
// ============================================================================

#[test]
fn test_analyze_customers() {
    let service = service_with("customers.csv", load_csv("customers.csv"));
    let report = service.analyze("customers").unwrap();

    assert_eq!(report.basic_stats.rows, 8);
    assert_eq!(report.basic_stats.columns, 6);
    assert_eq!(report.basic_stats.data_types["age"], ColumnKind::Numeric);
    assert_eq!(report.basic_stats.data_types["active"], ColumnKind::Boolean);
    assert_eq!(report.basic_stats.data_types["city"], ColumnKind::Text);

    assert_eq!(report.missing_values.total_missing, 4);
    assert_eq!(report.missing_values.total_cells, 48);
    assert_eq!(report.duplicates.total_duplicates, 1);
    assert_eq!(report.duplicates.remaining_rows, 7);

    let score = &report.quality_score;
    assert_eq!(score.completeness, 91.67);
    assert_eq!(score.uniqueness, 87.5);
    assert_eq!(score.overall_score, round_to((91.67 + 87.5) / 2.0, 2));
    assert_eq!(score.issues.missing_values, 4);
    assert_eq!(score.issues.duplicate_rows, 1);
}

#[test]
fn test_clean_customers_end_to_end() {
    let service = service_with("customers.csv", load_csv("customers.csv"));
    let options = CleaningOptions::builder()
        .clean_strings(true)
        .remove_duplicates(true)
        .remove_outliers(true)
        .build();

    let result = service.clean("customers", &options).unwrap();
    assert_eq!(result.cleaned_file_id, "customers_cleaned_1");
    assert_eq!(
        result.operations,
        vec![
            "Cleaned whitespace in 2 text column(s) (2 values changed)",
            "Removed 1 duplicate rows",
            "Removed 1 rows containing outliers",
        ]
    );
    assert_eq!(result.stats.rows, 6);
    assert_eq!(result.quality_score.uniqueness, 100.0);

    let export = service.download("customers_cleaned_1").unwrap();
    assert!(export.csv.starts_with("id,name,age,score,active,city\n1,alice,34,"));

    let reread = io::read_csv_bytes(export.csv.as_bytes(), &IngestConfig::default()).unwrap();
    let cleaned = service.registry().get("customers_cleaned_1").unwrap();
    assert_eq!(&reread, cleaned.as_ref());
}

#[test]
fn test_standardize_no_nulls() {
    let input = load_csv("no_nulls.csv");

    let zscore = CleaningOptions::builder()
        .standardize_data(ScalingMethod::Zscore)
        .build();
    let outcome = tabular_clean::pipeline::clean(&input, &zscore).unwrap();
    let values: Vec<f64> = outcome
        .table
        .numeric_values("height")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    assert!(mean.abs() < 1e-9);
    assert!((var.sqrt() - 1.0).abs() < 1e-9);
    assert_eq!(
        outcome.operations,
        vec!["Standardized 2 numeric column(s) using zscore scaling"]
    );

    let minmax = CleaningOptions::builder()
        .standardize_data(ScalingMethod::Minmax)
        .build();
    let outcome = tabular_clean::pipeline::clean(&input, &minmax).unwrap();
    let weights: Vec<f64> = outcome
        .table
        .numeric_values("weight")
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
    assert_eq!(weights.first(), Some(&0.0));
    assert_eq!(weights.last(), Some(&1.0));
    assert_eq!(
        column_text(&outcome.table, "label"),
        column_text(&input, "label")
    );
}

#[test]
fn test_correlation_no_nulls() {
    let service = service_with("no_nulls.csv", load_csv("no_nulls.csv"));
    let matrix = service.correlation("no_nulls").unwrap();

    assert_eq!(matrix.columns, vec!["height", "weight"]);
    assert_eq!(matrix.get("height", "height"), Some(1.0));
    assert_eq!(
        matrix.get("height", "weight"),
        matrix.get("weight", "height")
    );
    assert!(matrix.get("height", "weight").unwrap() > 0.99);
    assert_eq!(matrix.get("height", "label"), None);
}

// ============================================================================
// Property Tests
// ============================================================================

#[test]
fn test_all_disabled_is_identity() {
    let input = load_csv("customers.csv");
    let outcome = CleaningPipeline::builder().build().run(&input).unwrap();
    assert_eq!(outcome.table, input);
    assert!(outcome.operations.is_empty());
}

#[test]
fn test_dedup_is_idempotent() {
    let input = load_csv("customers.csv");
    let options = CleaningOptions::builder().remove_duplicates(true).build();

    let once = tabular_clean::pipeline::clean(&input, &options).unwrap();
    let twice = tabular_clean::pipeline::clean(&once.table, &options).unwrap();
    assert_eq!(twice.table, once.table);
    assert_eq!(twice.operations, vec!["Removed 0 duplicate rows"]);
}

#[test]
fn test_drop_leaves_other_columns_unchanged() {
    let input = load_csv("customers.csv");
    let options = CleaningOptions::builder()
        .drop_columns(["city", "not_a_column"])
        .build();
    let outcome = tabular_clean::pipeline::clean(&input, &options).unwrap();

    assert_eq!(outcome.operations, vec!["Dropped 1 column(s): city"]);
    assert!(!outcome.table.has_column("city"));
    for name in outcome.table.column_names() {
        assert_eq!(
            outcome.table.column_cells(&name).unwrap(),
            input.column_cells(&name).unwrap()
        );
    }
}

#[test]
fn test_scores_stay_in_range() {
    for fixture in ["customers.csv", "no_nulls.csv", "header_only.csv"] {
        let score = DataQualityAnalyzer::quality_score(&load_csv(fixture)).unwrap();
        for value in [score.overall_score, score.completeness, score.uniqueness] {
            assert!((0.0..=100.0).contains(&value), "{fixture}: {value}");
        }
    }
}

#[test]
fn test_drop_strategy_leaves_no_nulls() {
    let input = load_csv("customers.csv");
    let options = CleaningOptions::builder().fill_missing(FillStrategy::Drop).build();
    let outcome = tabular_clean::pipeline::clean(&input, &options).unwrap();

    assert_eq!(outcome.table.total_null_count(), 0);
    assert_eq!(outcome.table.row_count(), 4);
}

// ============================================================================
// Service And Registry Tests
// ============================================================================

#[test]
fn test_lineage_across_cleanings() {
    let service = service_with("abc.csv", load_csv("no_nulls.csv"));
    let options = CleaningOptions::builder().remove_duplicates(true).build();

    let first = service.clean("abc", &options).unwrap();
    let second = service.clean(&first.cleaned_file_id, &options).unwrap();
    let third = service.clean("abc", &options).unwrap();

    assert_eq!(first.cleaned_file_id, "abc_cleaned_1");
    assert_eq!(second.cleaned_file_id, "abc_cleaned_2");
    assert_eq!(third.cleaned_file_id, "abc_cleaned_3");
    assert_eq!(service.info("abc_cleaned_2").unwrap().root_id, "abc");
    assert_eq!(service.list().len(), 4);

    let err = service.clean("missing", &options).unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[test]
fn test_concurrent_cleanings_get_distinct_ids() {
    let service = Arc::new(service_with("abc.csv", load_csv("customers.csv")));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let options = CleaningOptions::builder().remove_duplicates(true).build();
                service.clean("abc", &options).unwrap().cleaned_file_id
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert_eq!(service.registry().len(), 7);
}

#[test]
fn test_clean_request_from_json() {
    let service = service_with("customers.csv", load_csv("customers.csv"));

    let request =
        CleaningRequest::from_json(r#"{"fill_missing": "median", "remove_duplicates": true}"#).unwrap();
    let result = service.clean_request("customers", request).unwrap();
    assert_eq!(result.operations.len(), 2);
    assert_eq!(result.operations[1], "Removed 1 duplicate rows");

    let bad = CleaningRequest::from_json(r#"{"standardize_data": "robust"}"#).unwrap();
    let err = service.clean_request("customers", bad).unwrap_err();
    assert_eq!(err.error_code(), "INVALID_OPTION");

    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "INVALID_OPTION");

    let malformed = CleaningRequest::from_json(r#"{"remove_duplicates": "#).unwrap_err();
    assert_eq!(malformed.error_code(), "JSON_ERROR");
}

#[test]
fn test_reports_serialize() {
    let service = service_with("customers.csv", load_csv("customers.csv"));
    let report = service.analyze("customers").unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["basic_stats"]["rows"], 8);
    assert_eq!(json["basic_stats"]["data_types"]["name"], "text");
    assert_eq!(json["duplicates"]["total_duplicates"], 1);

    let preview = serde_json::to_value(service.preview("customers", Some(1)).unwrap()).unwrap();
    assert_eq!(preview["data"][0][0], 1);
    assert_eq!(preview["data"][0][1], "  alice ");
    assert_eq!(preview["is_sampled"], false);
}

// ============================================================================
// Progress Reporting Tests
// ============================================================================

#[test]
fn test_progress_follows_stage_order() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let options = CleaningOptions::builder()
        .remove_outliers(true)
        .fill_missing(FillStrategy::ForwardFill)
        .drop_column("city")
        .build();
    CleaningPipeline::builder()
        .options(options)
        .on_progress(move |update| sink.lock().unwrap().push(update))
        .build()
        .run(&load_csv("customers.csv"))
        .unwrap();

    let updates = seen.lock().unwrap();
    let stages: Vec<CleaningStage> = updates.iter().map(|u| u.stage).collect();
    assert_eq!(
        stages,
        vec![
            CleaningStage::DropColumns,
            CleaningStage::FillMissing,
            CleaningStage::RemoveOutliers,
            CleaningStage::Complete,
        ]
    );
    assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress));
}
