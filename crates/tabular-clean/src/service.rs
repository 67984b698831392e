//! Dataset service.
//!
//! The object a serving layer holds: it owns the [`DatasetRegistry`] and
//! exposes every operation a client performs by dataset id.
//!
//! ```text
//! register_upload ──▶ file_id ──▶ preview / analyze / correlation
//!                        │
//!                        └──▶ clean ──▶ cleaned_file_id ──▶ download
//! ```

use crate::config::{CleaningOptions, CleaningRequest, ServiceConfig};
use crate::error::{Result, ResultExt};
use crate::io;
use crate::pipeline::CleaningPipeline;
use crate::profiler::{RawTable, TypeInferrer};
use crate::quality::DataQualityAnalyzer;
use crate::registry::{DatasetInfo, DatasetRegistry};
use crate::table::Table;
use crate::types::{AnalysisReport, CleaningResult, CorrelationMatrix, CsvExport, Preview, UploadResponse};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::{debug, info};

/// Registry plus the analysis and cleaning operations over it.
#[derive(Debug, Default)]
pub struct DatasetService {
    registry: DatasetRegistry,
    config: ServiceConfig,
}

static_assertions::assert_impl_all!(DatasetService: Send, Sync);

impl DatasetService {
    /// Create a service, validating the configuration.
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: DatasetRegistry::new(),
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    // ========================================================================
    // INGESTION
    // ========================================================================

    /// Shape raw uploaded text into a table and register it.
    pub fn register_upload(&self, file_name: &str, raw: &RawTable) -> Result<UploadResponse> {
        let table = TypeInferrer::new(&self.config.ingest)
            .build_table(raw)
            .context(format!("Failed to ingest '{}'", file_name))?;
        self.register_table(file_name, table)
    }

    /// Register an already typed table.
    ///
    /// The id is the file name without its extension; a name with no usable
    /// stem falls back to a minted `dataset_{n}` id.
    pub fn register_table(&self, file_name: &str, table: Table) -> Result<UploadResponse> {
        let stats = DataQualityAnalyzer::basic_stats(&table);
        let file_id = match file_stem(file_name) {
            Some(stem) => self.registry.insert(stem, table)?,
            None => self.registry.put(table),
        };

        info!(
            "Registered '{}' ({} rows x {} columns)",
            file_id, stats.rows, stats.columns
        );
        Ok(UploadResponse { file_id, stats })
    }

    // ========================================================================
    // READ OPERATIONS
    // ========================================================================

    pub fn info(&self, file_id: &str) -> Result<DatasetInfo> {
        self.registry.info(file_id)
    }

    pub fn list(&self) -> Vec<DatasetInfo> {
        self.registry.list()
    }

    /// Preview a registered dataset. `rows` defaults to the configured count.
    pub fn preview(&self, file_id: &str, rows: Option<usize>) -> Result<Preview> {
        let table = self.registry.get(file_id)?;
        let limit = rows.unwrap_or(self.config.default_preview_rows);
        self.preview_table(&table, limit)
    }

    /// First `limit` rows of a table, or a seeded random sample of `limit`
    /// rows (kept in row order) when the table exceeds the sample threshold.
    pub fn preview_table(&self, table: &Table, limit: usize) -> Result<Preview> {
        let total_rows = table.row_count();
        let is_sampled = total_rows > self.config.sample_threshold && limit < total_rows;

        let shown = if is_sampled {
            let mut rng = StdRng::seed_from_u64(self.config.sample_seed);
            let mut indices = rand::seq::index::sample(&mut rng, total_rows, limit).into_vec();
            indices.sort_unstable();
            debug!("Sampled {} of {} rows for preview", limit, total_rows);
            table.select_rows(&indices)?
        } else {
            table.head(limit)
        };

        Ok(Preview {
            columns: shown.column_names(),
            rows_shown: shown.row_count(),
            data: shown.rows()?,
            total_rows,
            is_sampled,
        })
    }

    pub fn analyze(&self, file_id: &str) -> Result<AnalysisReport> {
        let table = self.registry.get(file_id)?;
        DataQualityAnalyzer::analyze(&table).context(format!("Failed to analyze '{}'", file_id))
    }

    pub fn correlation(&self, file_id: &str) -> Result<CorrelationMatrix> {
        let table = self.registry.get(file_id)?;
        DataQualityAnalyzer::correlation_matrix(&table)
    }

    // ========================================================================
    // CLEANING
    // ========================================================================

    /// Clean a dataset and register the result under a new lineage id.
    ///
    /// The source dataset is left untouched.
    pub fn clean(&self, file_id: &str, options: &CleaningOptions) -> Result<CleaningResult> {
        let table = self.registry.get(file_id)?;
        let outcome = CleaningPipeline::new(options.clone())
            .run(&table)
            .context(format!("Failed to clean '{}'", file_id))?;

        let stats = DataQualityAnalyzer::basic_stats(&outcome.table);
        let quality_score = DataQualityAnalyzer::quality_score(&outcome.table)?;
        let cleaned_file_id = self.registry.put_derived(file_id, outcome.table)?;

        info!(
            "Cleaned '{}' into '{}' ({} operation(s))",
            file_id,
            cleaned_file_id,
            outcome.operations.len()
        );
        Ok(CleaningResult {
            original_file_id: file_id.to_string(),
            cleaned_file_id,
            operations: outcome.operations,
            stats,
            quality_score,
        })
    }

    /// Clean from a raw client request; unknown strategies are rejected
    /// before anything runs.
    pub fn clean_request(&self, file_id: &str, request: CleaningRequest) -> Result<CleaningResult> {
        let options = CleaningOptions::try_from(request)?;
        self.clean(file_id, &options)
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    /// Export a dataset as CSV.
    pub fn download(&self, file_id: &str) -> Result<CsvExport> {
        let table = self.registry.get(file_id)?;
        let bytes = io::export_csv(&table)?;
        let csv = String::from_utf8_lossy(&bytes).into_owned();

        Ok(CsvExport {
            file_id: file_id.to_string(),
            csv,
            rows: table.row_count(),
            columns: table.column_count(),
        })
    }
}

/// File name without directory or extension, `None` when nothing is left.
fn file_stem(file_name: &str) -> Option<String> {
    Path::new(file_name.trim())
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FillStrategy;
    use crate::profiler::RawColumn;
    use crate::table::Cell;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn raw() -> RawTable {
        RawTable::new(vec![
            RawColumn::new("id", vec![Some("1"), Some("2"), Some("2"), Some("3")]),
            RawColumn::new("name", vec![Some("a"), Some("b"), Some("b"), Some("c")]),
        ])
    }

    fn numbers(n: i64) -> Table {
        Table::from_dataframe(df!["n" => (0..n).collect::<Vec<i64>>()].unwrap()).unwrap()
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("sales.csv").as_deref(), Some("sales"));
        assert_eq!(file_stem("dir/abc.csv").as_deref(), Some("abc"));
        assert_eq!(file_stem("noext").as_deref(), Some("noext"));
        assert_eq!(file_stem("  ").as_deref(), None);
    }

    #[test]
    fn test_register_upload() {
        let service = DatasetService::default();
        let response = service.register_upload("abc.csv", &raw()).unwrap();
        assert_eq!(response.file_id, "abc");
        assert_eq!(response.stats.rows, 4);
        assert_eq!(response.stats.columns, 2);

        let err = service.register_upload("abc.csv", &raw()).unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
    }

    #[test]
    fn test_register_without_name_mints_id() {
        let service = DatasetService::default();
        let response = service.register_table("", numbers(3)).unwrap();
        assert_eq!(response.file_id, "dataset_1");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ServiceConfig {
            default_preview_rows: 0,
            ..ServiceConfig::default()
        };
        let err = DatasetService::new(config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_preview_head() {
        let service = DatasetService::default();
        service.register_table("n.csv", numbers(20)).unwrap();

        let preview = service.preview("n", None).unwrap();
        assert_eq!(preview.rows_shown, 5);
        assert_eq!(preview.total_rows, 20);
        assert!(!preview.is_sampled);
        assert_eq!(preview.data[4], vec![Cell::Int(4)]);

        let all = service.preview("n", Some(100)).unwrap();
        assert_eq!(all.rows_shown, 20);
    }

    #[test]
    fn test_preview_samples_large_tables() {
        let config = ServiceConfig::builder().sample_threshold(50).build().unwrap();
        let service = DatasetService::new(config).unwrap();
        service.register_table("big.csv", numbers(200)).unwrap();

        let first = service.preview("big", Some(10)).unwrap();
        let second = service.preview("big", Some(10)).unwrap();
        assert!(first.is_sampled);
        assert_eq!(first.rows_shown, 10);
        assert_eq!(first, second);

        let values: Vec<i64> = first
            .data
            .iter()
            .map(|row| match row[0] {
                Cell::Int(v) => v,
                _ => panic!("expected integer cell"),
            })
            .collect();
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(values, sorted);
    }

    #[test]
    fn test_clean_registers_lineage() {
        let service = DatasetService::default();
        service.register_upload("abc.csv", &raw()).unwrap();
        let options = CleaningOptions::builder().remove_duplicates(true).build();

        let first = service.clean("abc", &options).unwrap();
        assert_eq!(first.cleaned_file_id, "abc_cleaned_1");
        assert_eq!(first.operations, vec!["Removed 1 duplicate rows"]);
        assert_eq!(first.stats.rows, 3);
        assert_eq!(first.quality_score.uniqueness, 100.0);

        let second = service.clean("abc_cleaned_1", &options).unwrap();
        assert_eq!(second.cleaned_file_id, "abc_cleaned_2");
        assert_eq!(second.original_file_id, "abc_cleaned_1");

        // source untouched
        assert_eq!(service.preview("abc", Some(10)).unwrap().total_rows, 4);
    }

    #[test]
    fn test_clean_request_rejects_unknown_strategy() {
        let service = DatasetService::default();
        service.register_upload("abc.csv", &raw()).unwrap();
        let request = CleaningRequest {
            fill_missing: Some("average".to_string()),
            ..CleaningRequest::default()
        };

        let err = service.clean_request("abc", request).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_OPTION");
        assert_eq!(service.registry().len(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let service = DatasetService::default();
        assert_eq!(service.analyze("nope").unwrap_err().error_code(), "NOT_FOUND");
        assert_eq!(service.preview("nope", None).unwrap_err().error_code(), "NOT_FOUND");
        assert_eq!(service.download("nope").unwrap_err().error_code(), "NOT_FOUND");
        let options = CleaningOptions::builder().fill_missing(FillStrategy::Mean).build();
        assert_eq!(service.clean("nope", &options).unwrap_err().error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_download() {
        let service = DatasetService::default();
        service.register_upload("abc.csv", &raw()).unwrap();
        let export = service.download("abc").unwrap();
        assert_eq!(export.rows, 4);
        assert_eq!(export.columns, 2);
        assert!(export.csv.starts_with("id,name\n1,a\n"));
    }
}
