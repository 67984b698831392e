//! Whitespace sanitization for text columns.

use crate::error::Result;
use crate::table::{ColumnKind, Table};
use crate::utils::normalize_whitespace;
use polars::prelude::*;
use tracing::debug;

/// Trim and collapse whitespace in a string Series.
///
/// Returns the cleaned Series and the number of values that changed.
/// Nulls stay null.
pub fn clean_text_series(series: &Series) -> Result<(Series, usize)> {
    let str_series = series.str()?;
    let mut changed = 0usize;
    let mut cleaned_values: Vec<Option<String>> = Vec::with_capacity(str_series.len());

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => {
                let cleaned = normalize_whitespace(val);
                if cleaned != val {
                    changed += 1;
                }
                cleaned_values.push(Some(cleaned));
            }
            None => cleaned_values.push(None),
        }
    }

    Ok((Series::new(series.name().clone(), cleaned_values), changed))
}

/// Clean every text column of a table.
///
/// Skipped (nothing logged) when the table has no text column.
pub(crate) fn clean_string_columns(table: Table, operations: &mut Vec<String>) -> Result<Table> {
    let text_columns = table.columns_of_kind(ColumnKind::Text);
    if text_columns.is_empty() {
        debug!("No text columns, skipping string cleaning");
        return Ok(table);
    }

    let mut df = table.into_dataframe();
    let mut total_changed = 0usize;
    for col_name in &text_columns {
        let (cleaned, changed) = clean_text_series(df.column(col_name)?.as_materialized_series())?;
        df.replace(col_name, cleaned)?;
        total_changed += changed;
        debug!("Cleaned '{}': {} values changed", col_name, changed);
    }

    operations.push(format!(
        "Cleaned whitespace in {} text column(s) ({} values changed)",
        text_columns.len(),
        total_changed
    ));
    Ok(Table::from_frame(df))
}
