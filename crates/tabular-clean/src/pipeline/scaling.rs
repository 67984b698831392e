//! Numeric rescaling.
//!
//! Z-score uses the sample standard deviation (n - 1). A column is left
//! unchanged when it cannot be rescaled: fewer than two values or zero
//! deviation for z-score, `max == min` for min-max. Rescaled columns are
//! stored as Float64.

use crate::config::ScalingMethod;
use crate::error::Result;
use crate::profiler::statistics;
use crate::table::{ColumnKind, Table};
use polars::prelude::*;
use tracing::debug;

/// Applies a [`ScalingMethod`] to every numeric column.
pub struct NumericScaler;

impl NumericScaler {
    /// Rescale numeric columns. Logs one operation when at least one column
    /// was rescaled.
    pub fn standardize(
        table: Table,
        method: ScalingMethod,
        operations: &mut Vec<String>,
    ) -> Result<Table> {
        if !method.is_enabled() {
            return Ok(table);
        }

        let mut replacements = Vec::new();
        for col_name in table.columns_of_kind(ColumnKind::Numeric) {
            let values = table.numeric_values(&col_name)?;
            match Self::scale(&values, method) {
                Some(scaled) => replacements.push(Series::new(col_name.as_str().into(), scaled)),
                None => debug!("Column '{}' cannot be {} scaled, leaving as is", col_name, method),
            }
        }

        if replacements.is_empty() {
            debug!("No numeric column could be scaled");
            return Ok(table);
        }

        let scaled_count = replacements.len();
        let mut df = table.into_dataframe();
        for series in replacements {
            let name = series.name().to_string();
            df.replace(&name, series)?;
        }

        operations.push(format!(
            "Standardized {} numeric column(s) using {} scaling",
            scaled_count, method
        ));
        Ok(Table::from_frame(df))
    }

    /// Rescale one column's values, `None` when the column must stay as is.
    pub fn scale(values: &[Option<f64>], method: ScalingMethod) -> Option<Vec<Option<f64>>> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let (offset, divisor) = match method {
            ScalingMethod::Zscore => {
                let std = statistics::sample_std(&present)?;
                if std == 0.0 || !std.is_finite() {
                    return None;
                }
                (statistics::mean(&present)?, std)
            }
            ScalingMethod::Minmax => {
                let (min, max) = statistics::min_max(&present)?;
                let range = max - min;
                if range == 0.0 || !range.is_finite() {
                    return None;
                }
                (min, range)
            }
            ScalingMethod::None => return None,
        };

        Some(
            values
                .iter()
                .map(|v| v.map(|x| (x - offset) / divisor))
                .collect(),
        )
    }
}
