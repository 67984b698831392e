use crate::error::Result;
use crate::profiler::{DataProfiler, statistics};
use crate::table::{ColumnKind, Table};
use crate::types::{
    AnalysisReport, BasicStats, ColumnMissing, CorrelationMatrix, DuplicateReport,
    MissingValueReport, QualityIssues, QualityScore,
};
use crate::utils::{percentage, round_to};
use tracing::debug;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Full analysis of a table. Total over every well-formed table,
    /// including ones without rows or columns.
    pub fn analyze(table: &Table) -> Result<AnalysisReport> {
        let basic_stats = Self::basic_stats(table);
        let column_stats = DataProfiler::profile_columns(table)?;
        let missing_values = Self::missing_values(table)?;
        let duplicates = Self::duplicates(table)?;
        let quality_score = Self::score(&missing_values, &duplicates, table.row_count());

        debug!(
            "Analyzed {}x{} table: quality {:.2}",
            basic_stats.rows, basic_stats.columns, quality_score.overall_score
        );

        Ok(AnalysisReport {
            basic_stats,
            column_stats,
            missing_values,
            duplicates,
            quality_score,
        })
    }

    pub fn basic_stats(table: &Table) -> BasicStats {
        BasicStats {
            rows: table.row_count(),
            columns: table.column_count(),
            memory_usage_mb: round_to(table.estimated_size() as f64 / BYTES_PER_MB, 2),
            column_names: table.column_names(),
            data_types: table.schema().into_iter().collect(),
        }
    }

    pub fn missing_values(table: &Table) -> Result<MissingValueReport> {
        let rows = table.row_count();
        let columns = table
            .column_names()
            .into_iter()
            .map(|name| {
                let count = table.null_count(&name)?;
                Ok(ColumnMissing {
                    name,
                    count,
                    percentage: percentage(count, rows),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let total_missing = columns.iter().map(|c| c.count).sum();
        Ok(MissingValueReport {
            columns,
            total_missing,
            total_cells: table.cell_count(),
        })
    }

    pub fn duplicates(table: &Table) -> Result<DuplicateReport> {
        let rows = table.row_count();
        let total_duplicates = table.duplicate_row_count()?;
        Ok(DuplicateReport {
            total_duplicates,
            percentage: percentage(total_duplicates, rows),
            remaining_rows: rows - total_duplicates,
        })
    }

    /// Quality score of a table.
    pub fn quality_score(table: &Table) -> Result<QualityScore> {
        let missing = Self::missing_values(table)?;
        let duplicates = Self::duplicates(table)?;
        Ok(Self::score(&missing, &duplicates, table.row_count()))
    }

    fn score(missing: &MissingValueReport, duplicates: &DuplicateReport, rows: usize) -> QualityScore {
        let completeness = if missing.total_cells == 0 {
            100.0
        } else {
            100.0 * (1.0 - missing.total_missing as f64 / missing.total_cells as f64)
        };
        let uniqueness = if rows == 0 {
            100.0
        } else {
            100.0 * (rows - duplicates.total_duplicates) as f64 / rows as f64
        };

        let completeness = round_to(completeness, 2);
        let uniqueness = round_to(uniqueness, 2);
        QualityScore {
            overall_score: round_to((completeness + uniqueness) / 2.0, 2),
            completeness,
            uniqueness,
            issues: QualityIssues {
                missing_values: missing.total_missing,
                duplicate_rows: duplicates.total_duplicates,
            },
        }
    }

    /// Pearson correlation between every pair of numeric columns, rounded
    /// to 3 places. Empty when the table has no numeric column.
    pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
        let columns = table.columns_of_kind(ColumnKind::Numeric);
        let series = columns
            .iter()
            .map(|name| table.numeric_values(name))
            .collect::<Result<Vec<_>>>()?;

        let values = series
            .iter()
            .map(|xs| {
                series
                    .iter()
                    .map(|ys| statistics::pearson(xs, ys).map(|r| round_to(r, 3)))
                    .collect()
            })
            .collect();

        Ok(CorrelationMatrix { columns, values })
    }
}
