//! This module provides the main entry point for analysing a location: it loads
//! the location's history table and forecast runs once and answers alignment
//! and histogram requests from the loaded tables.

use crate::analysis::align::align;
use crate::analysis::binning::{histogram, DEFAULT_MAX_LEAD_DAYS, DEFAULT_VALUE_BINS};
use crate::error::ForecastAccuracyError;
use crate::tables::loader::TableLoader;
use crate::tables::table::WeatherTable;
use crate::types::alignment::AlignmentRecord;
use crate::types::granularity::Granularity;
use crate::types::histogram::ErrorHistogram;
use crate::types::quantity::Quantity;
use bon::bon;
use std::path::{Path, PathBuf};

/// History and forecast runs of one location at one granularity.
///
/// Create an instance with [`Forecasts::open()`], which reads the tables from
/// the standard directory layout, or [`Forecasts::from_tables()`] for tables
/// that are already in memory.
///
/// # Examples
///
/// ```no_run
/// use forecast_accuracy::{Forecasts, Granularity, Quantity};
///
/// # fn main() -> Result<(), forecast_accuracy::ForecastAccuracyError> {
/// let forecasts = Forecasts::open()
///     .location("Orinda")
///     .granularity(Granularity::Daily)
///     .call()?;
///
/// let histogram = forecasts
///     .relative_histogram()
///     .quantity(Quantity::MaximumTemperature)
///     .call()?;
/// println!("{} forecasts binned", histogram.total());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Forecasts {
    location: String,
    granularity: Granularity,
    history: WeatherTable,
    forecast_runs: Vec<WeatherTable>,
}

#[bon]
impl Forecasts {
    /// Loads a location's tables from disk.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(&str)`: **Required.** Location name as used in file names.
    /// * `.granularity(Granularity)`: Optional. Defaults to [`Granularity::Daily`].
    /// * `.data_dir(PathBuf)`: Optional. Directory holding `Forecasts*` and `History*`. Defaults to `.`.
    /// * `.forecasts_dir(PathBuf)` / `.history_dir(PathBuf)`: Optional. Override the
    ///   standard directories; both must be given to take effect.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastAccuracyError::Table`] if the history file or the forecast
    /// directory is missing, a file cannot be parsed, or a date is malformed.
    #[builder]
    pub fn open(
        location: &str,
        granularity: Option<Granularity>,
        data_dir: Option<PathBuf>,
        forecasts_dir: Option<PathBuf>,
        history_dir: Option<PathBuf>,
    ) -> Result<Self, ForecastAccuracyError> {
        let granularity = granularity.unwrap_or_default();
        let loader = match (forecasts_dir, history_dir) {
            (Some(forecasts_dir), Some(history_dir)) => {
                TableLoader::with_dirs(forecasts_dir, history_dir, granularity)
            }
            _ => TableLoader::new(
                data_dir.as_deref().unwrap_or_else(|| Path::new(".")),
                granularity,
            ),
        };

        let forecast_runs = loader.read_forecasts(location)?;
        let history = loader.read_history(location)?;
        Ok(Self::from_tables(location, granularity, history, forecast_runs))
    }

    pub fn from_tables(
        location: impl Into<String>,
        granularity: Granularity,
        history: WeatherTable,
        forecast_runs: Vec<WeatherTable>,
    ) -> Self {
        Self {
            location: location.into(),
            granularity,
            history,
            forecast_runs,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn history(&self) -> &WeatherTable {
        &self.history
    }

    pub fn forecast_runs(&self) -> &[WeatherTable] {
        &self.forecast_runs
    }

    /// Pairs every observation of `quantity` with the forecasts that predicted it.
    /// See [`crate::align`].
    pub fn align(&self, quantity: Quantity) -> Result<Vec<AlignmentRecord>, ForecastAccuracyError> {
        Ok(align(&self.history, &self.forecast_runs, quantity)?)
    }

    /// Bins the forecast errors of `quantity` by lead day and error.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.quantity(Quantity)`: **Required.**
    /// * `.value_bins(usize)`: Optional. Number of error bins. Defaults to `20`.
    /// * `.max_lead_days(u32)`: Optional. Last lead day kept. Defaults to `14`.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastAccuracyError::Histogram`] when the errors have no
    /// spread, and [`ForecastAccuracyError::Table`] when the quantity column
    /// is missing.
    #[builder]
    pub fn relative_histogram(
        &self,
        quantity: Quantity,
        value_bins: Option<usize>,
        max_lead_days: Option<u32>,
    ) -> Result<ErrorHistogram, ForecastAccuracyError> {
        let records = self.align(quantity)?;
        Ok(histogram(
            &records,
            value_bins.unwrap_or(DEFAULT_VALUE_BINS),
            max_lead_days.unwrap_or(DEFAULT_MAX_LEAD_DAYS),
        )?)
    }
}
