//! Runtime configuration: provider credentials and endpoint, data directory
//! and the locations to collect.

use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the configured API key.
pub const API_KEY_ENV: &str = "VISUAL_CROSSING_API_KEY";

const CONFIG_DIR_NAME: &str = "forecast-accuracy";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str =
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/weatherdata";

/// Location plotted when none is given on the command line.
pub const DEFAULT_LOCATION: &str = "Orinda";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] Box<toml::de::Error>),

    #[error("No API key configured; set VISUAL_CROSSING_API_KEY or `api_key` in the config file")]
    MissingApiKey,
}

/// A location as sent to the provider (`query`) and as named in file names (`name`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    pub query: String,
    pub name: String,
}

impl Location {
    pub fn new(query: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub unit_group: String,
    pub forecast_days: u32,
    /// First day requested when a location has no history file yet.
    pub history_start: NaiveDate,
    pub locations: Vec<Location>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: PathBuf::from("."),
            unit_group: "us".to_string(),
            forecast_days: 15,
            history_start: NaiveDate::from_ymd_opt(2021, 3, 11).unwrap_or_default(),
            locations: vec![
                Location::new("32 Camino Del Diablo", "Orinda"),
                Location::new("Jamestown, CA", "Jamestown"),
                Location::new("Yosemite Village, CA", "Yosemite"),
                Location::new("Bishop, CA", "Bishop"),
                Location::new("Portland, OR", "Portland"),
                Location::new("Cincinnati, OH", "Cincinnati"),
            ],
        }
    }
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default file under the
    /// user's config directory is used when present, otherwise the built-in
    /// defaults. The API key environment variable always takes precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), Box::new(e)))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

/// `<config_dir>/forecast-accuracy/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
