mod analysis;
pub mod chart_data;
mod collect;
mod config;
mod dates;
mod error;
mod forecasts;
#[cfg(feature = "plotting")]
pub mod plotting;
mod tables;
mod types;
mod utils;

pub use error::ForecastAccuracyError;
pub use forecasts::Forecasts;

pub use analysis::align::align;
pub use analysis::binning::{histogram, DEFAULT_MAX_LEAD_DAYS, DEFAULT_VALUE_BINS};
pub use analysis::colored_line::{recency_norm, recency_scale, shade_level, ColoredLine, Normalize, Segment};
pub use dates::{datetime_from_day_number, day_number, normalize, parse_date_key, DateParseError};

pub use types::alignment::AlignmentRecord;
pub use types::granularity::{Granularity, HOURLY_AGGREGATE_HOURS};
pub use types::histogram::ErrorHistogram;
pub use types::quantity::Quantity;

pub use tables::loader::TableLoader;
pub use tables::table::{WeatherTable, DATE_COLUMN};

pub use collect::collector::{CollectReport, Collector, CsvBody, QUOTA_EXCEEDED_PREFIX};
pub use collect::query::{redact, Endpoint};
pub use collect::window::{history_window, HistoryWindow};
pub use config::{default_config_path, Config, Location, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_LOCATION};

pub use analysis::error::HistogramError;
pub use collect::error::CollectError;
pub use config::ConfigError;
pub use tables::error::TableError;
