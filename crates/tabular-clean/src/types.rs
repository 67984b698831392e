use crate::table::{Cell, ColumnKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicStats {
    pub rows: usize,
    pub columns: usize,
    /// Approximate; derived from the engine's size estimate.
    pub memory_usage_mb: f64,
    pub column_names: Vec<String>,
    pub data_types: BTreeMap<String, ColumnKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub kind: ColumnKind,
    pub non_null_count: usize,
    pub null_count: usize,
    pub unique_values: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_common: Option<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMissing {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingValueReport {
    pub columns: Vec<ColumnMissing>,
    pub total_missing: usize,
    pub total_cells: usize,
}

impl MissingValueReport {
    /// Columns with at least one missing value.
    pub fn affected_columns(&self) -> impl Iterator<Item = &ColumnMissing> {
        self.columns.iter().filter(|c| c.count > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub total_duplicates: usize,
    pub percentage: f64,
    pub remaining_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssues {
    pub missing_values: usize,
    pub duplicate_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub overall_score: f64,
    pub completeness: f64,
    pub uniqueness: f64,
    pub issues: QualityIssues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub basic_stats: BasicStats,
    pub column_stats: Vec<ColumnStats>,
    pub missing_values: MissingValueReport,
    pub duplicates: DuplicateReport,
    pub quality_score: QualityScore,
}

/// Pairwise Pearson coefficients; `values[i][j]` pairs `columns[i]` with
/// `columns[j]`. `None` where the coefficient is undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningResult {
    pub original_file_id: String,
    pub cleaned_file_id: String,
    pub operations: Vec<String>,
    pub stats: BasicStats,
    pub quality_score: QualityScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Cell>>,
    pub rows_shown: usize,
    pub total_rows: usize,
    pub is_sampled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub stats: BasicStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvExport {
    pub file_id: String,
    pub csv: String,
    pub rows: usize,
    pub columns: usize,
}
