use crate::tables::error::TableError;
use crate::tables::table::WeatherTable;
use crate::types::granularity::Granularity;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Locates and reads the history table and forecast runs of a location.
///
/// Layout below the data directory:
///
/// ```text
/// History[_hourly]/<location>.csv
/// Forecasts[_hourly]/<location><YYYYMMDD>.csv
/// ```
pub struct TableLoader {
    forecasts_dir: PathBuf,
    history_dir: PathBuf,
    granularity: Granularity,
}

impl TableLoader {
    pub fn new(data_dir: &Path, granularity: Granularity) -> TableLoader {
        TableLoader {
            forecasts_dir: data_dir.join(granularity.forecasts_dir_name()),
            history_dir: data_dir.join(granularity.history_dir_name()),
            granularity,
        }
    }

    /// Uses explicit directories instead of the standard names under a data directory.
    pub fn with_dirs(forecasts_dir: PathBuf, history_dir: PathBuf, granularity: Granularity) -> Self {
        TableLoader {
            forecasts_dir,
            history_dir,
            granularity,
        }
    }

    pub fn forecasts_dir(&self) -> &Path {
        &self.forecasts_dir
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    pub fn history_path(&self, location: &str) -> PathBuf {
        self.history_dir.join(format!("{location}.csv"))
    }

    pub fn read_history(&self, location: &str) -> Result<WeatherTable, TableError> {
        let path = self.history_path(location);
        let table = WeatherTable::read_csv(&path, self.granularity)?;
        info!(
            "Loaded {} history rows for {} from {:?}",
            table.len(),
            location,
            path
        );
        Ok(table)
    }

    /// Lists forecast files for a location, sorted by file name so runs come
    /// out in collection order.
    pub fn forecast_paths(&self, location: &str) -> Result<Vec<PathBuf>, TableError> {
        let entries = fs::read_dir(&self.forecasts_dir)
            .map_err(|e| TableError::DirectoryRead(self.forecasts_dir.clone(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TableError::DirectoryRead(self.forecasts_dir.clone(), e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                debug!("Skipping non UTF-8 file name {:?}", file_name);
                continue;
            };
            if name.starts_with(location) && name.ends_with(".csv") {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }

    pub fn read_forecasts(&self, location: &str) -> Result<Vec<WeatherTable>, TableError> {
        let paths = self.forecast_paths(location)?;
        if paths.is_empty() {
            warn!(
                "No forecast runs found for {} in {:?}",
                location, self.forecasts_dir
            );
        }

        let runs = paths
            .iter()
            .map(|path| WeatherTable::read_csv(path, self.granularity))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            "Loaded {} forecast runs for {} from {:?}",
            runs.len(),
            location,
            self.forecasts_dir
        );
        Ok(runs)
    }
}
