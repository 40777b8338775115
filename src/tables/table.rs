//! Contains [`WeatherTable`], the in-memory form of one history table or one
//! forecast run.

use crate::dates::normalize;
use crate::tables::error::TableError;
use crate::types::granularity::Granularity;
use crate::types::quantity::Quantity;
use polars::prelude::*;
use std::path::Path;

/// Name of the timestamp column shared by history and forecast tables.
pub const DATE_COLUMN: &str = "Date time";

/// A history table or a single forecast run.
///
/// Holds the raw `Date time` keys (used for exact matching), their day numbers
/// (used for lead-time arithmetic) and the underlying `DataFrame` from which
/// quantity columns are read on demand. Tables are immutable once loaded.
#[derive(Debug, Clone)]
pub struct WeatherTable {
    source: String,
    granularity: Granularity,
    frame: DataFrame,
    date_keys: Vec<String>,
    day_numbers: Vec<f64>,
}

impl WeatherTable {
    /// Builds a table from an already loaded `DataFrame`.
    ///
    /// # Arguments
    ///
    /// * `frame` - Must contain a string `Date time` column without nulls.
    /// * `granularity` - Decides the format used to parse the keys.
    /// * `source` - Label used in error messages, usually the file path.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ColumnNotFound`] when the date column is absent,
    /// [`TableError::MissingDate`] for null keys and [`TableError::DateParse`]
    /// for keys that do not match the granularity's format.
    pub fn from_frame(
        frame: DataFrame,
        granularity: Granularity,
        source: impl Into<String>,
    ) -> Result<Self, TableError> {
        let source = source.into();
        let date_column = frame
            .column(DATE_COLUMN)
            .map_err(|e| TableError::ColumnNotFound {
                table: source.clone(),
                column: DATE_COLUMN.to_string(),
                source: e,
            })?;
        let keys = date_column.str().map_err(|e| TableError::ColumnType {
            table: source.clone(),
            column: DATE_COLUMN.to_string(),
            source: e,
        })?;

        let date_keys = keys
            .into_iter()
            .enumerate()
            .map(|(row, key)| {
                key.map(str::to_string).ok_or_else(|| TableError::MissingDate {
                    table: source.clone(),
                    row,
                })
            })
            .collect::<Result<Vec<String>, TableError>>()?;

        let day_numbers = normalize(date_keys.iter().map(String::as_str), granularity)
            .map_err(|e| TableError::DateParse {
                table: source.clone(),
                source: e,
            })?;

        Ok(Self {
            source,
            granularity,
            frame,
            date_keys,
            day_numbers,
        })
    }

    /// Reads a CSV table with a header row.
    pub fn read_csv(path: &Path, granularity: Granularity) -> Result<Self, TableError> {
        if !path.is_file() {
            return Err(TableError::FileNotFound(path.to_path_buf()));
        }

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| TableError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?
            .finish()
            .map_err(|e| TableError::CsvRead {
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::from_frame(frame, granularity, path.display().to_string())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn len(&self) -> usize {
        self.date_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.date_keys.is_empty()
    }

    pub fn date_keys(&self) -> &[String] {
        &self.date_keys
    }

    pub fn day_numbers(&self) -> &[f64] {
        &self.day_numbers
    }

    /// Day number of the first row. For a forecast run this is the date the
    /// run was issued.
    pub fn issued_day_number(&self) -> Option<f64> {
        self.day_numbers.first().copied()
    }

    pub fn last_date_key(&self) -> Option<&str> {
        self.date_keys.last().map(String::as_str)
    }

    pub fn has_quantity(&self, quantity: Quantity) -> bool {
        self.frame.column(quantity.column_name()).is_ok()
    }

    /// Reads a quantity column as floats. Empty cells become `None`.
    pub fn values(&self, quantity: Quantity) -> Result<Vec<Option<f64>>, TableError> {
        let column_name = quantity.column_name();
        let column = self
            .frame
            .column(column_name)
            .map_err(|e| TableError::ColumnNotFound {
                table: self.source.clone(),
                column: column_name.to_string(),
                source: e,
            })?;
        let type_error = |e| TableError::ColumnType {
            table: self.source.clone(),
            column: column_name.to_string(),
            source: e,
        };
        let floats = column.cast(&DataType::Float64).map_err(type_error)?;
        let values = floats.f64().map_err(type_error)?.into_iter().collect();
        Ok(values)
    }
}
