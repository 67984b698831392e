//! In-memory columnar dataset.
//!
//! A [`Table`] wraps a polars [`DataFrame`] whose columns are restricted to
//! three kinds:
//!
//! | kind      | storage                                  |
//! |-----------|------------------------------------------|
//! | numeric   | `Int64`, or `Float64` once fractional    |
//! | boolean   | `Boolean`                                |
//! | text      | `String`                                 |
//!
//! Tables are immutable. Every transformation returns a new table; the
//! underlying column buffers are shared, so cloning is cheap.

use crate::error::{CleaningError, Result};
use crate::utils::{is_boolean_dtype, is_integer_dtype, is_numeric_dtype, is_text_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Column kinds and cells
// ============================================================================

/// Logical kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Text,
}

impl ColumnKind {
    /// Kind for a storage dtype, `None` for dtypes a table never holds.
    pub fn from_dtype(dtype: &DataType) -> Option<Self> {
        if is_numeric_dtype(dtype) {
            Some(Self::Numeric)
        } else if is_boolean_dtype(dtype) {
            Some(Self::Boolean)
        } else if is_text_dtype(dtype) {
            Some(Self::Text)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single value. Missing values are always [`Cell::Null`].
///
/// Serializes as the bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Hashable identity of the cell. Two nulls compare equal.
    pub fn key(&self) -> CellKey {
        match self {
            Cell::Null => CellKey::Null,
            Cell::Int(v) => CellKey::Int(*v),
            // -0.0 and 0.0 are the same value
            Cell::Float(v) => CellKey::Float(if *v == 0.0 { 0 } else { v.to_bits() }),
            Cell::Bool(v) => CellKey::Bool(*v),
            Cell::Text(v) => CellKey::Text(v.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

/// Hashable form of a [`Cell`], used for row equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Null,
    Int(i64),
    Float(u64),
    Bool(bool),
    Text(String),
}

// ============================================================================
// Table
// ============================================================================

/// An immutable dataset: uniquely named columns of equal length.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}

static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// A table with no columns (and therefore no rows).
    pub fn empty() -> Self {
        Self {
            df: DataFrame::empty(),
        }
    }

    /// Wrap a DataFrame, normalizing column storage.
    ///
    /// Integer columns become `Int64`, float columns `Float64`. Columns of
    /// any dtype other than numeric, boolean or string are rejected.
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let normalized = match series.dtype() {
                dtype if is_integer_dtype(dtype) => series.cast(&DataType::Int64)?,
                dtype if is_numeric_dtype(dtype) => series.cast(&DataType::Float64)?,
                DataType::Boolean | DataType::String => series.clone(),
                // An all-null column without a concrete type is read as text
                DataType::Null => series.cast(&DataType::String)?,
                other => {
                    return Err(CleaningError::InvalidTable(format!(
                        "column '{}' has unsupported type {}",
                        series.name(),
                        other
                    )));
                }
            };
            columns.push(Column::from(normalized));
        }
        Self::from_columns(columns)
    }

    /// Build a table from already-normalized columns, checking names and lengths.
    pub(crate) fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name().to_string()) {
                return Err(CleaningError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(ragged) = columns.iter().find(|c| c.len() != expected) {
                return Err(CleaningError::InvalidTable(format!(
                    "column '{}' has {} values, expected {}",
                    ragged.name(),
                    ragged.len(),
                    expected
                )));
            }
        }
        if columns.is_empty() {
            return Ok(Self::empty());
        }
        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Wrap a frame produced by a cleaning stage. The frame must already hold
    /// normalized columns.
    pub(crate) fn from_frame(df: DataFrame) -> Self {
        if df.width() == 0 {
            return Self::empty();
        }
        Self { df }
    }

    /// Borrow the underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Take the underlying DataFrame.
    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Number of rows. Zero for a table without columns.
    pub fn row_count(&self) -> usize {
        if self.df.width() == 0 { 0 } else { self.df.height() }
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    /// `row_count * column_count`.
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Kind of the named column.
    pub fn column_kind(&self, name: &str) -> Result<ColumnKind> {
        let column = self
            .df
            .column(name)
            .map_err(|_| CleaningError::InvalidTable(format!("no column named '{name}'")))?;
        ColumnKind::from_dtype(column.dtype()).ok_or_else(|| {
            CleaningError::InvalidTable(format!(
                "column '{name}' has unsupported type {}",
                column.dtype()
            ))
        })
    }

    /// `(name, kind)` for every column, in table order.
    pub fn schema(&self) -> Vec<(String, ColumnKind)> {
        self.df
            .get_columns()
            .iter()
            .filter_map(|c| ColumnKind::from_dtype(c.dtype()).map(|k| (c.name().to_string(), k)))
            .collect()
    }

    /// Names of the columns of a given kind, in table order.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.schema()
            .into_iter()
            .filter(|(_, k)| *k == kind)
            .map(|(name, _)| name)
            .collect()
    }

    /// Null count of one column.
    pub fn null_count(&self, name: &str) -> Result<usize> {
        Ok(self.series(name)?.null_count())
    }

    /// Nulls across the whole table.
    pub fn total_null_count(&self) -> usize {
        self.df.get_columns().iter().map(|c| c.null_count()).sum()
    }

    /// Borrow a column as a Series.
    pub fn series(&self, name: &str) -> Result<&Series> {
        let column = self
            .df
            .column(name)
            .map_err(|_| CleaningError::InvalidTable(format!("no column named '{name}'")))?;
        Ok(column.as_materialized_series())
    }

    /// Every value of a column, in row order.
    pub fn column_cells(&self, name: &str) -> Result<Vec<Cell>> {
        series_cells(self.series(name)?)
    }

    /// Values of a numeric column as f64. Errors for non-numeric columns.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self.series(name)?;
        if !is_numeric_dtype(series.dtype()) {
            return Err(CleaningError::InvalidTable(format!(
                "column '{name}' is not numeric"
            )));
        }
        let floats = series.cast(&DataType::Float64)?;
        Ok(floats.f64()?.into_iter().collect())
    }

    /// All rows as cells, row-major.
    pub fn rows(&self) -> Result<Vec<Vec<Cell>>> {
        let columns = self
            .df
            .get_columns()
            .iter()
            .map(|c| series_cells(c.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = vec![Vec::with_capacity(columns.len()); self.row_count()];
        for column in columns {
            for (row, cell) in rows.iter_mut().zip(column) {
                row.push(cell);
            }
        }
        Ok(rows)
    }

    /// Hashable key per row. Rows with equal keys are equal in every column.
    pub fn row_keys(&self) -> Result<Vec<Vec<CellKey>>> {
        Ok(self
            .rows()?
            .into_iter()
            .map(|row| row.iter().map(Cell::key).collect())
            .collect())
    }

    /// `true` for the first occurrence of each distinct row.
    pub fn first_occurrence_mask(&self) -> Result<Vec<bool>> {
        let mut seen = HashSet::new();
        Ok(self
            .row_keys()?
            .into_iter()
            .map(|key| seen.insert(key))
            .collect())
    }

    /// Rows that repeat an earlier row.
    pub fn duplicate_row_count(&self) -> Result<usize> {
        Ok(self
            .first_occurrence_mask()?
            .into_iter()
            .filter(|first| !first)
            .count())
    }

    /// Keep the rows whose mask entry is `true`, in order.
    pub fn filter_rows(&self, mask: &[bool]) -> Result<Table> {
        if mask.len() != self.row_count() {
            return Err(CleaningError::InvalidTable(format!(
                "row mask has {} entries, table has {} rows",
                mask.len(),
                self.row_count()
            )));
        }
        if self.column_count() == 0 {
            return Ok(Self::empty());
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(Self::from_frame(self.df.filter(&mask)?))
    }

    /// Keep the rows at the given indices, in ascending index order.
    pub fn select_rows(&self, indices: &[usize]) -> Result<Table> {
        let mut mask = vec![false; self.row_count()];
        for &idx in indices {
            if let Some(slot) = mask.get_mut(idx) {
                *slot = true;
            }
        }
        self.filter_rows(&mask)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Self::from_frame(self.df.head(Some(n)))
    }

    /// Remove the named columns; names not present are ignored.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Table {
        let to_drop: Vec<PlSmallStr> = names
            .iter()
            .filter(|name| self.has_column(name.as_ref()))
            .map(|name| PlSmallStr::from(name.as_ref()))
            .collect();
        if to_drop.is_empty() {
            return self.clone();
        }
        Self::from_frame(self.df.drop_many(to_drop))
    }

    /// Rough in-memory size in bytes.
    pub fn estimated_size(&self) -> usize {
        self.df.estimated_size()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.schema() == other.schema()
            && match (self.rows(), other.rows()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
    }
}

/// Convert a normalized Series into cells.
pub(crate) fn series_cells(series: &Series) -> Result<Vec<Cell>> {
    let cells = match series.dtype() {
        DataType::Int64 => series
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Int))
            .collect(),
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Float))
            .collect(),
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, Cell::Bool))
            .collect(),
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
            .collect(),
        other => {
            return Err(CleaningError::InvalidTable(format!(
                "column '{}' has unsupported type {}",
                series.name(),
                other
            )));
        }
    };
    Ok(cells)
}
