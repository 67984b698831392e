//! Missing-value strategies.
//!
//! Mean/median fill numeric columns only, empty-string fills text columns
//! only, forward fill applies to every column and drop removes every row
//! that still has a null anywhere.

use crate::config::FillStrategy;
use crate::error::Result;
use crate::profiler::statistics;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use tracing::debug;

/// Fills or drops missing values according to a [`FillStrategy`].
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Apply `strategy` to the table.
    ///
    /// Logs one operation when the strategy found at least one applicable
    /// column; otherwise returns the table unchanged.
    pub fn fill_missing(
        table: Table,
        strategy: FillStrategy,
        operations: &mut Vec<String>,
    ) -> Result<Table> {
        match strategy {
            FillStrategy::None => Ok(table),
            FillStrategy::Mean | FillStrategy::Median => {
                Self::fill_numeric(table, strategy, operations)
            }
            FillStrategy::ForwardFill => Self::forward_fill(table, operations),
            FillStrategy::EmptyString => Self::fill_empty_string(table, operations),
            FillStrategy::Drop => Self::drop_incomplete_rows(table, operations),
        }
    }

    fn log_filled(operations: &mut Vec<String>, strategy: FillStrategy, filled: usize) {
        operations.push(format!(
            "Filled missing values using {} strategy ({} values filled)",
            strategy, filled
        ));
    }

    /// Mean or median imputation over numeric columns.
    ///
    /// Columns with no present value have no statistic and keep their nulls.
    /// Integer columns that receive fills are widened to float.
    fn fill_numeric(
        table: Table,
        strategy: FillStrategy,
        operations: &mut Vec<String>,
    ) -> Result<Table> {
        let mut replacements = Vec::new();
        let mut applicable = 0usize;
        let mut filled = 0usize;

        for col_name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = table.numeric_values(&col_name)?;
            let present: Vec<f64> = values.iter().flatten().copied().collect();
            let stat = match strategy {
                FillStrategy::Mean => statistics::mean(&present),
                _ => statistics::median(&present),
            };
            let Some(fill_value) = stat else {
                debug!("No values in '{}', nothing to impute from", col_name);
                continue;
            };
            applicable += 1;

            let missing = values.len() - present.len();
            if missing == 0 {
                continue;
            }
            let series = table.series(&col_name)?;
            replacements.push(fill_numeric_nulls(series, fill_value)?);
            filled += missing;
            debug!("Filled {} nulls in '{}' with {} {}", missing, col_name, strategy, fill_value);
        }

        if applicable == 0 {
            debug!("No numeric column with a computable {}, skipping fill", strategy);
            return Ok(table);
        }

        let table = replace_columns(table, replacements)?;
        Self::log_filled(operations, strategy, filled);
        Ok(table)
    }

    /// Carry the last present value forward. Leading nulls stay null.
    fn forward_fill(table: Table, operations: &mut Vec<String>) -> Result<Table> {
        if table.column_count() == 0 {
            return Ok(table);
        }

        let mut replacements = Vec::new();
        let mut filled = 0usize;
        for col_name in table.column_names() {
            let series = table.series(&col_name)?;
            let before = series.null_count();
            if before == 0 {
                continue;
            }
            let forward = series.fill_null(FillNullStrategy::Forward(None))?;
            filled += before - forward.null_count();
            replacements.push(forward);
        }

        let table = replace_columns(table, replacements)?;
        Self::log_filled(operations, FillStrategy::ForwardFill, filled);
        Ok(table)
    }

    /// Replace nulls in text columns with `""`.
    fn fill_empty_string(table: Table, operations: &mut Vec<String>) -> Result<Table> {
        let text_columns = table.columns_of_kind(ColumnKind::Text);
        if text_columns.is_empty() {
            debug!("No text columns, skipping empty-string fill");
            return Ok(table);
        }

        let mut replacements = Vec::new();
        let mut filled = 0usize;
        for col_name in &text_columns {
            let series = table.series(col_name)?;
            let missing = series.null_count();
            if missing == 0 {
                continue;
            }
            replacements.push(fill_string_nulls(series, "")?);
            filled += missing;
        }

        let table = replace_columns(table, replacements)?;
        Self::log_filled(operations, FillStrategy::EmptyString, filled);
        Ok(table)
    }

    /// Remove every row containing at least one null.
    fn drop_incomplete_rows(table: Table, operations: &mut Vec<String>) -> Result<Table> {
        if table.column_count() == 0 {
            return Ok(table);
        }

        let mask: Vec<bool> = table
            .rows()?
            .iter()
            .map(|row| row.iter().all(|cell| !cell.is_null()))
            .collect();
        let before = table.row_count();
        let table = table.filter_rows(&mask)?;
        let dropped = before - table.row_count();

        operations.push(format!(
            "Dropped {} rows with missing values (drop strategy)",
            dropped
        ));
        debug!("Dropped {} rows with missing values", dropped);
        Ok(table)
    }
}

/// Fill nulls in a numeric Series with `value`, producing a Float64 Series.
pub fn fill_numeric_nulls(series: &Series, value: f64) -> Result<Series> {
    let floats = series.cast(&DataType::Float64)?;
    let filled: Vec<Option<f64>> = floats
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill nulls in a string Series with `value`.
pub fn fill_string_nulls(series: &Series, value: &str) -> Result<Series> {
    let filled: Vec<Option<&str>> = series
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Swap in replacement columns by name.
fn replace_columns(table: Table, replacements: Vec<Series>) -> Result<Table> {
    if replacements.is_empty() {
        return Ok(table);
    }
    let mut df = table.into_dataframe();
    for series in replacements {
        let name = series.name().to_string();
        df.replace(&name, series)?;
    }
    Ok(Table::from_frame(df))
}
