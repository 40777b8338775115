//! Defines the time granularity of the collected tables and everything that
//! depends on it: directory naming, `Date time` formats and request windows.

use std::fmt;

/// Aggregation hours value that selects hourly tables.
pub const HOURLY_AGGREGATE_HOURS: u32 = 1;

/// Represents the time granularity of a location's forecast and history tables.
///
/// Hourly tables are stored in directories with a `_hourly` suffix and carry a
/// time of day in their `Date time` column; daily tables carry only the date.
///
/// # Examples
///
/// ```
/// use forecast_accuracy::Granularity;
///
/// assert_eq!(Granularity::from_aggregate_hours(1), Granularity::Hourly);
/// assert_eq!(Granularity::from_aggregate_hours(24), Granularity::Daily);
/// assert_eq!(Granularity::from_aggregate_hours(12), Granularity::Daily);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// One row per hour, `MM/DD/YYYY HH:MM:SS` keys.
    Hourly,
    /// One row per day, `MM/DD/YYYY` keys.
    #[default]
    Daily,
}

impl Granularity {
    /// Selects the granularity from the provider's `aggregateHours` value.
    /// Only `1` selects hourly data.
    pub fn from_aggregate_hours(aggregate_hours: u32) -> Self {
        if aggregate_hours == HOURLY_AGGREGATE_HOURS {
            Granularity::Hourly
        } else {
            Granularity::Daily
        }
    }

    pub fn is_hourly(&self) -> bool {
        matches!(self, Granularity::Hourly)
    }

    /// Suffix appended to the `Forecasts` and `History` directory names.
    pub(crate) fn dir_suffix(&self) -> &'static str {
        match self {
            Granularity::Hourly => "_hourly",
            Granularity::Daily => "",
        }
    }

    /// `chrono` format of the raw `Date time` keys.
    pub(crate) fn date_format(&self) -> &'static str {
        match self {
            Granularity::Hourly => "%m/%d/%Y %H:%M:%S",
            Granularity::Daily => "%m/%d/%Y",
        }
    }

    pub(crate) fn forecasts_dir_name(&self) -> String {
        format!("Forecasts{}", self.dir_suffix())
    }

    pub(crate) fn history_dir_name(&self) -> String {
        format!("History{}", self.dir_suffix())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => write!(f, "hourly"),
            Granularity::Daily => write!(f, "daily"),
        }
    }
}
