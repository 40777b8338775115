//! Decides which date range the next history request covers.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Request timestamps in the provider's `startDateTime`/`endDateTime` format.
pub const REQUEST_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Days of data allowed per request for each aggregation hour, a limit set by
/// the provider's daily record quota.
const DAYS_PER_AGGREGATE_HOUR: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl HistoryWindow {
    pub fn start_param(&self) -> String {
        self.start.format(REQUEST_DATETIME_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(REQUEST_DATETIME_FORMAT).to_string()
    }
}

/// Computes the next window to request.
///
/// The window starts the day after `last_recorded`, or at `default_start` for a
/// new history file, and ends at 23:00 on the earlier of `today` and
/// `start + 3 * aggregate_hours` days. Returns `None` when the history is
/// already up to date.
pub fn history_window(
    last_recorded: Option<NaiveDate>,
    default_start: NaiveDate,
    today: NaiveDate,
    aggregate_hours: u32,
) -> Option<HistoryWindow> {
    let start = match last_recorded {
        Some(last) => last.succ_opt()?,
        None => default_start,
    };

    let max_days = DAYS_PER_AGGREGATE_HOUR * i64::from(aggregate_hours);
    let latest_allowed = start + Duration::days(max_days);
    let end = if today > latest_allowed {
        latest_allowed
    } else if start > today {
        return None;
    } else {
        today
    };

    Some(HistoryWindow {
        start: start.and_time(NaiveTime::MIN),
        end: end.and_time(NaiveTime::from_hms_opt(23, 0, 0)?),
    })
}
