//! Outlier handling module.
//!
//! Removes rows holding an IQR outlier in any numeric column. Bounds are
//! `[Q1 - 1.5 * IQR, Q3 + 1.5 * IQR]` with linearly interpolated quartiles,
//! all computed on the stage input before any row is removed. Columns with
//! fewer than [`MIN_VALUES_FOR_IQR`] present values do not participate, and
//! nulls never count as outliers.

use crate::error::Result;
use crate::profiler::statistics;
use crate::table::{ColumnKind, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum present values for a column to take part in outlier detection.
pub const MIN_VALUES_FOR_IQR: usize = 4;

const IQR_MULTIPLIER: f64 = 1.5;

/// Inclusive bounds outside which a value is an outlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Bounds for a set of present values, `None` below the minimum count.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.len() < MIN_VALUES_FOR_IQR {
            return None;
        }
        let q1 = statistics::quantile(values, 0.25)?;
        let q3 = statistics::quantile(values, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Bounds for every participating numeric column, in table order.
    pub fn column_bounds(table: &Table) -> Result<Vec<(String, IqrBounds)>> {
        let mut bounds = Vec::new();
        for col_name in table.columns_of_kind(ColumnKind::Numeric) {
            let present: Vec<f64> = table
                .numeric_values(&col_name)?
                .into_iter()
                .flatten()
                .collect();
            if let Some(b) = IqrBounds::from_values(&present) {
                bounds.push((col_name, b));
            }
        }
        Ok(bounds)
    }

    /// Remove rows with an outlier in any participating column.
    ///
    /// Skipped (nothing logged) when no column participates.
    pub fn remove_outliers(table: Table, operations: &mut Vec<String>) -> Result<Table> {
        let bounds = Self::column_bounds(&table)?;
        if bounds.is_empty() {
            debug!("No numeric column with enough values for IQR, skipping outlier removal");
            return Ok(table);
        }

        let mut mask = vec![true; table.row_count()];
        for (col_name, b) in &bounds {
            let values = table.numeric_values(col_name)?;
            let mut flagged = 0usize;
            for (keep, value) in mask.iter_mut().zip(values) {
                if let Some(v) = value
                    && !b.contains(v)
                {
                    *keep = false;
                    flagged += 1;
                }
            }
            debug!(
                "'{}': bounds [{:.4}, {:.4}], {} outliers",
                col_name, b.lower, b.upper, flagged
            );
        }

        let before = table.row_count();
        let table = table.filter_rows(&mask)?;
        let removed = before - table.row_count();

        operations.push(format!("Removed {} rows containing outliers", removed));
        debug!("Removed {} rows containing outliers", removed);
        Ok(table)
    }
}
