use crate::dates::DateParseError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table file '{0}' does not exist")]
    FileNotFound(PathBuf),

    #[error("Failed to list forecast directory '{0}'")]
    DirectoryRead(PathBuf, #[source] std::io::Error),

    // Errors during CSV reading
    #[error("Parsing error reading CSV table '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Required column '{column}' not found in table {table}")]
    ColumnNotFound {
        table: String,
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Column '{column}' in table {table} is not numeric")]
    ColumnType {
        table: String,
        column: String,
        #[source]
        source: PolarsError,
    },

    #[error("Missing date in table {table} at row {row}")]
    MissingDate { table: String, row: usize },

    #[error("Malformed date in table {table}")]
    DateParse {
        table: String,
        #[source]
        source: DateParseError,
    },
}
