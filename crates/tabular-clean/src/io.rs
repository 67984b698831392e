//! CSV ingestion and export.
//!
//! Files are read with every column as text and then shaped by
//! [`TypeInferrer`], so the configured null markers and the numeric/boolean
//! rules apply uniformly no matter what the CSV reader would have guessed.

use crate::config::IngestConfig;
use crate::error::{CleaningError, Result, ResultExt};
use crate::profiler::TypeInferrer;
use crate::table::Table;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Read a CSV file with a header row into a typed table.
pub fn read_csv_path(path: impl AsRef<Path>, config: &IngestConfig) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(CleaningError::from)
        .context(format!("Failed to open CSV '{}'", path.display()))?;
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .into_reader_with_file_handle(file)
        .finish()
        .context(format!("Failed to read CSV '{}'", path.display()))?;

    debug!("Read {:?} from '{}'", df.shape(), path.display());
    TypeInferrer::new(config).build_from_text_frame(&df)
}

/// Read CSV content held in memory (UTF-8, header row required).
pub fn read_csv_bytes(bytes: &[u8], config: &IngestConfig) -> Result<Table> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Table::empty());
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(0))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .context("Failed to parse CSV content")?;

    TypeInferrer::new(config).build_from_text_frame(&df)
}

/// Serialize a table as CSV with a header row. Nulls become empty fields.
pub fn export_csv(table: &Table) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    if table.column_count() == 0 {
        return Ok(buf);
    }

    let mut df = table.dataframe().clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context("Failed to write CSV")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, ColumnKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_csv_bytes_infers_kinds() {
        let csv = b"id,score,active,name\n1,10.5,true,alice\n2,NA,false,bob\n";
        let table = read_csv_bytes(csv, &IngestConfig::default()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_kind("id").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.column_kind("score").unwrap(), ColumnKind::Numeric);
        assert_eq!(table.column_kind("active").unwrap(), ColumnKind::Boolean);
        assert_eq!(table.column_kind("name").unwrap(), ColumnKind::Text);
        assert_eq!(
            table.column_cells("score").unwrap(),
            vec![Cell::Float(10.5), Cell::Null]
        );
    }

    #[test]
    fn test_read_empty_content() {
        let table = read_csv_bytes(b"", &IngestConfig::default()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 0);
    }

    #[test]
    fn test_export_csv() {
        let csv = b"a,b\n1,x\n,y\n";
        let table = read_csv_bytes(csv, &IngestConfig::default()).unwrap();
        let out = String::from_utf8(export_csv(&table).unwrap()).unwrap();

        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("a,b"));
        assert_eq!(lines.next(), Some("1,x"));
        assert_eq!(lines.next(), Some(",y"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_export_then_read_keeps_table() {
        let csv = b"n,label\n1,\"hello, world\"\n2,plain\n";
        let table = read_csv_bytes(csv, &IngestConfig::default()).unwrap();
        let back = read_csv_bytes(&export_csv(&table).unwrap(), &IngestConfig::default()).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_export_zero_columns() {
        assert!(export_csv(&Table::empty()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = read_csv_path("/definitely/not/here.csv", &IngestConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("Failed to open CSV"));
        assert!(!err.is_client_error());
    }
}
