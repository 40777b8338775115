//! Builds request URLs for the provider's forecast and history services.

use crate::collect::error::CollectError;
use crate::collect::window::HistoryWindow;
use crate::config::{Config, Location};
use reqwest::Url;

const FORECAST_PATH: &str = "forecast";
const HISTORY_PATH: &str = "history";

/// Provider endpoint plus the parameters shared by every request.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: String,
    api_key: String,
    unit_group: String,
    forecast_days: u32,
}

impl Endpoint {
    /// # Errors
    ///
    /// Returns [`CollectError::Config`] when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Self, CollectError> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key()?.to_string(),
            unit_group: config.unit_group.clone(),
            forecast_days: config.forecast_days,
        })
    }

    pub fn forecast_url(
        &self,
        location: &Location,
        aggregate_hours: u32,
    ) -> Result<Url, CollectError> {
        let aggregate_hours = aggregate_hours.to_string();
        let forecast_days = self.forecast_days.to_string();
        let params = [
            ("locations", location.query.as_str()),
            ("aggregateHours", aggregate_hours.as_str()),
            ("forecastDays", forecast_days.as_str()),
            ("combinationMethod", "aggregate"),
            ("contentType", "csv"),
            ("unitGroup", self.unit_group.as_str()),
            ("locationMode", "single"),
            ("dataElements", "default"),
            ("shortColumnNames", "false"),
            ("includeAstronomy", "false"),
            ("key", self.api_key.as_str()),
        ];
        self.url(FORECAST_PATH, &params)
    }

    pub fn history_url(
        &self,
        location: &Location,
        aggregate_hours: u32,
        window: &HistoryWindow,
    ) -> Result<Url, CollectError> {
        let aggregate_hours = aggregate_hours.to_string();
        let start = window.start_param();
        let end = window.end_param();
        let params = [
            ("locations", location.query.as_str()),
            ("aggregateHours", aggregate_hours.as_str()),
            ("unitGroup", self.unit_group.as_str()),
            ("contentType", "csv"),
            ("shortColumnNames", "false"),
            ("includeAstronomy", "false"),
            ("combinationMethod", "aggregate"),
            ("dataElements", "default"),
            ("startDateTime", start.as_str()),
            ("endDateTime", end.as_str()),
            ("dayStartTime", "0:0:00"),
            ("dayEndTime", "0:0:00"),
            ("key", self.api_key.as_str()),
        ];
        self.url(HISTORY_PATH, &params)
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, CollectError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse_with_params(&raw, params).map_err(|e| CollectError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

/// Renders a URL for logs and errors with the API key hidden.
pub fn redact(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
