//! Converts raw `Date time` keys into a numeric day axis.
//!
//! Day numbers count days since 1970-01-01T00:00:00 and carry the time of day
//! as a fraction, so daily and hourly tables share the same axis and can be
//! subtracted directly.

use crate::types::granularity::Granularity;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Error)]
#[error("Failed to parse date '{value}' at row {row} with format '{format}'")]
pub struct DateParseError {
    pub row: usize,
    pub value: String,
    pub format: &'static str,
    #[source]
    pub source: chrono::ParseError,
}

/// Parses a raw key using the format of the given granularity.
/// Daily keys resolve to midnight.
pub fn parse_date_key(
    key: &str,
    granularity: Granularity,
) -> Result<NaiveDateTime, chrono::ParseError> {
    let format = granularity.date_format();
    match granularity {
        Granularity::Daily => {
            NaiveDate::parse_from_str(key, format).map(|date| date.and_time(NaiveTime::MIN))
        }
        Granularity::Hourly => NaiveDateTime::parse_from_str(key, format),
    }
}

/// Fractional days since the Unix epoch.
pub fn day_number(datetime: NaiveDateTime) -> f64 {
    datetime.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

/// Inverse of [`day_number`], to the nearest second. `None` when out of range.
pub fn datetime_from_day_number(day: f64) -> Option<NaiveDateTime> {
    let seconds = (day * SECONDS_PER_DAY).round();
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds as i64, 0).map(|datetime| datetime.naive_utc())
}

/// Parses every key into its day number, failing on the first malformed one.
pub fn normalize<'a, I>(keys: I, granularity: Granularity) -> Result<Vec<f64>, DateParseError>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .enumerate()
        .map(|(row, key)| {
            parse_date_key(key, granularity)
                .map(day_number)
                .map_err(|source| DateParseError {
                    row,
                    value: key.to_string(),
                    format: granularity.date_format(),
                    source,
                })
        })
        .collect()
}
