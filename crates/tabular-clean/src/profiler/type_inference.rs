//! Type inference for raw text columns.
//!
//! A column is numeric when every non-null token is a base-10 literal that
//! fits a finite f64 (so `1e400` makes the column text rather than a null),
//! boolean when every non-null token is `true`/`false`, and text otherwise.
//! Columns with no non-null token default to text. Inference never fails;
//! only structurally malformed input (duplicate names, ragged columns) is
//! rejected when the table is assembled.

use crate::config::IngestConfig;
use crate::error::{CleaningError, Result};
use crate::table::{ColumnKind, Table};
use crate::utils::{parse_bool_literal, parse_float_literal, parse_int_literal};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One column of raw tokens, `None` where the source had no value at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl RawColumn {
    pub fn new<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(|v| v.map(Into::into)).collect(),
        }
    }
}

/// Raw tabular input as handed over by an upload collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self { columns }
    }

    /// Build from a header and row-major records. Short records are padded
    /// with missing values; long records are an error.
    pub fn from_records(header: Vec<String>, records: Vec<Vec<Option<String>>>) -> Result<Self> {
        let width = header.len();
        let mut columns: Vec<RawColumn> = header
            .into_iter()
            .map(|name| RawColumn {
                name,
                values: Vec::with_capacity(records.len()),
            })
            .collect();

        for (idx, record) in records.into_iter().enumerate() {
            if record.len() > width {
                return Err(CleaningError::InvalidTable(format!(
                    "record {} has {} fields, header has {}",
                    idx + 1,
                    record.len(),
                    width
                )));
            }
            let mut fields = record.into_iter();
            for column in columns.iter_mut() {
                column.values.push(fields.next().flatten());
            }
        }

        Ok(Self { columns })
    }
}

/// Infers column kinds and builds typed tables.
pub struct TypeInferrer<'a> {
    config: &'a IngestConfig,
}

impl<'a> TypeInferrer<'a> {
    pub fn new(config: &'a IngestConfig) -> Self {
        Self { config }
    }

    fn is_missing(&self, token: Option<&str>) -> bool {
        match token {
            None => true,
            Some(raw) => self.config.is_null_marker(raw),
        }
    }

    /// Decide the kind of a column from its raw tokens.
    pub fn infer_kind<'t, I>(&self, tokens: I) -> ColumnKind
    where
        I: IntoIterator<Item = Option<&'t str>>,
    {
        let mut present = 0usize;
        let mut numeric = true;
        let mut boolean = self.config.detect_booleans;

        for token in tokens {
            if self.is_missing(token) {
                continue;
            }
            let Some(raw) = token else { continue };
            present += 1;
            numeric = numeric && parse_float_literal(raw).is_some();
            boolean = boolean && parse_bool_literal(raw).is_some();
            if !numeric && !boolean {
                return ColumnKind::Text;
            }
        }

        if present == 0 {
            ColumnKind::Text
        } else if numeric {
            ColumnKind::Numeric
        } else if boolean {
            ColumnKind::Boolean
        } else {
            ColumnKind::Text
        }
    }

    /// Build a typed column from raw tokens.
    pub fn build_column(&self, name: &str, values: &[Option<String>]) -> Column {
        let tokens = || values.iter().map(|v| v.as_deref());
        let kind = self.infer_kind(tokens());

        let series = match kind {
            ColumnKind::Numeric => {
                let ints: Option<Vec<Option<i64>>> = tokens()
                    .map(|t| match t {
                        _ if self.is_missing(t) => Some(None),
                        Some(raw) => parse_int_literal(raw).map(Some),
                        None => Some(None),
                    })
                    .collect();
                match ints {
                    Some(ints) => Series::new(name.into(), ints),
                    None => {
                        let floats: Vec<Option<f64>> = tokens()
                            .map(|t| {
                                if self.is_missing(t) {
                                    None
                                } else {
                                    t.and_then(parse_float_literal)
                                }
                            })
                            .collect();
                        Series::new(name.into(), floats)
                    }
                }
            }
            ColumnKind::Boolean => {
                let bools: Vec<Option<bool>> = tokens()
                    .map(|t| {
                        if self.is_missing(t) {
                            None
                        } else {
                            t.and_then(parse_bool_literal)
                        }
                    })
                    .collect();
                Series::new(name.into(), bools)
            }
            ColumnKind::Text => {
                let texts: Vec<Option<&str>> = tokens()
                    .map(|t| if self.is_missing(t) { None } else { t })
                    .collect();
                Series::new(name.into(), texts)
            }
        };

        debug!("Inferred column '{}' as {}", name, kind);
        Column::from(series)
    }

    /// Build a typed table from raw columns.
    pub fn build_table(&self, raw: &RawTable) -> Result<Table> {
        let columns = raw
            .columns
            .iter()
            .map(|c| self.build_column(&c.name, &c.values))
            .collect();
        Table::from_columns(columns)
    }

    /// Build a typed table from a DataFrame read with every column as text.
    ///
    /// Non-string columns are rendered to text first so the same inference
    /// rules apply to them.
    pub fn build_from_text_frame(&self, df: &DataFrame) -> Result<Table> {
        let mut raw = RawTable::default();
        for column in df.get_columns() {
            let as_text = column.as_materialized_series().cast(&DataType::String)?;
            let values = as_text
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            raw.columns.push(RawColumn {
                name: column.name().to_string(),
                values,
            });
        }
        self.build_table(&raw)
    }
}
