//! Table-level cleaning operations.
//!
//! This module provides:
//! - Dropping user-selected columns
//! - Removing duplicate rows (first occurrence kept, nulls compare equal)
//! - Whitespace normalization for text columns

mod sanitizers;

pub(crate) use sanitizers::clean_string_columns;
pub use sanitizers::clean_text_series;

use crate::error::Result;
use crate::table::Table;
use std::collections::BTreeSet;
use tracing::debug;

/// Structural cleaning: column pruning and deduplication.
pub struct DataCleaner;

impl DataCleaner {
    /// Drop every named column present in the table. Unknown names are
    /// ignored; when none match, the table is returned unchanged and no
    /// operation is logged.
    pub fn drop_columns(
        table: Table,
        columns: &BTreeSet<String>,
        operations: &mut Vec<String>,
    ) -> Result<Table> {
        let present: Vec<&String> = columns.iter().filter(|c| table.has_column(c)).collect();
        if present.is_empty() {
            debug!("No requested columns present, skipping column drop");
            return Ok(table);
        }

        let dropped = table.drop_columns(&present);
        operations.push(format!(
            "Dropped {} column(s): {}",
            present.len(),
            present
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        debug!("Dropped columns {:?}", present);
        Ok(dropped)
    }

    /// Keep the first occurrence of each distinct row, in original order.
    /// Always logs, even when nothing was removed.
    pub fn remove_duplicates(table: Table, operations: &mut Vec<String>) -> Result<Table> {
        let before = table.row_count();
        let mask = table.first_occurrence_mask()?;
        let deduped = table.filter_rows(&mask)?;
        let removed = before - deduped.row_count();

        operations.push(format!("Removed {} duplicate rows", removed));
        debug!("Removed {} duplicate rows", removed);
        Ok(deduped)
    }
}
