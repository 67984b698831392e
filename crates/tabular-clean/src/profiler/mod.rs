//! Column profiling for tables.
//!
//! This module provides:
//! - Type inference that turns raw text columns into a typed [`Table`]
//! - Per-column statistics (counts, distinct values, numeric summary, mode)
//! - Small statistical helpers shared with the cleaning stages

pub mod statistics;
mod type_inference;

use crate::error::Result;
use crate::table::{Cell, CellKey, ColumnKind, Table};
use crate::types::{ColumnStats, NumericSummary};
use std::collections::BTreeMap;

pub use type_inference::{RawColumn, RawTable, TypeInferrer};

/// Computes per-column statistics.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column, in table order.
    pub fn profile_columns(table: &Table) -> Result<Vec<ColumnStats>> {
        table
            .column_names()
            .iter()
            .map(|name| Self::profile_column(table, name))
            .collect()
    }

    /// Profile a single column.
    pub fn profile_column(table: &Table, name: &str) -> Result<ColumnStats> {
        let kind = table.column_kind(name)?;
        let cells = table.column_cells(name)?;

        let null_count = cells.iter().filter(|c| c.is_null()).count();
        let non_null_count = cells.len() - null_count;

        let mut counts: BTreeMap<CellKey, (usize, &Cell)> = BTreeMap::new();
        for cell in cells.iter().filter(|c| !c.is_null()) {
            counts.entry(cell.key()).or_insert((0, cell)).0 += 1;
        }

        let (numeric, most_common) = match kind {
            ColumnKind::Numeric => {
                let values: Vec<f64> = cells.iter().filter_map(Cell::as_f64).collect();
                (Self::numeric_summary(&values), None)
            }
            ColumnKind::Boolean | ColumnKind::Text => (None, Self::mode(&counts)),
        };

        Ok(ColumnStats {
            name: name.to_string(),
            kind,
            non_null_count,
            null_count,
            unique_values: counts.len(),
            numeric,
            most_common,
        })
    }

    fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
        let (min, max) = statistics::min_max(values)?;
        Some(NumericSummary {
            min,
            max,
            mean: statistics::mean(values)?,
            median: statistics::median(values)?,
            std: statistics::sample_std(values),
        })
    }

    /// Most frequent value; ties go to the smallest value in sort order.
    fn mode(counts: &BTreeMap<CellKey, (usize, &Cell)>) -> Option<Cell> {
        let mut best: Option<(usize, &Cell)> = None;
        for &(count, cell) in counts.values() {
            if best.is_none_or(|(top, _)| count > top) {
                best = Some((count, cell));
            }
        }
        best.map(|(_, cell)| cell.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        let df = df![
            "age" => [Some(30i64), Some(40), None, Some(20)],
            "city" => [Some("Oslo"), Some("Rome"), Some("Rome"), None],
            "flag" => [true, false, true, false],
        ]
        .unwrap();
        Table::from_dataframe(df).unwrap()
    }

    #[test]
    fn test_numeric_column_stats() {
        let stats = DataProfiler::profile_column(&table(), "age").unwrap();
        assert_eq!(stats.kind, ColumnKind::Numeric);
        assert_eq!(stats.non_null_count, 3);
        assert_eq!(stats.null_count, 1);
        assert_eq!(stats.unique_values, 3);
        assert_eq!(stats.most_common, None);

        let numeric = stats.numeric.unwrap();
        assert_eq!(numeric.min, 20.0);
        assert_eq!(numeric.max, 40.0);
        assert_eq!(numeric.mean, 30.0);
        assert_eq!(numeric.median, 30.0);
        assert_eq!(numeric.std, Some(10.0));
    }

    #[test]
    fn test_text_column_mode() {
        let stats = DataProfiler::profile_column(&table(), "city").unwrap();
        assert_eq!(stats.kind, ColumnKind::Text);
        assert_eq!(stats.unique_values, 2);
        assert_eq!(stats.most_common, Some(Cell::Text("Rome".to_string())));
        assert!(stats.numeric.is_none());
    }

    #[test]
    fn test_mode_ties_pick_smallest() {
        let stats = DataProfiler::profile_column(&table(), "flag").unwrap();
        assert_eq!(stats.most_common, Some(Cell::Bool(false)));
    }

    #[test]
    fn test_all_null_column() {
        let df = df!["x" => [None::<f64>, None]].unwrap();
        let table = Table::from_dataframe(df).unwrap();
        let stats = DataProfiler::profile_column(&table, "x").unwrap();
        assert_eq!(stats.non_null_count, 0);
        assert_eq!(stats.unique_values, 0);
        assert!(stats.numeric.is_none());
    }

    #[test]
    fn test_profile_columns_keeps_order() {
        let names: Vec<String> = DataProfiler::profile_columns(&table())
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["age", "city", "flag"]);
    }
}
