//! Frames behind the charts.
//!
//! Line charts read one wide `DataFrame`: a [`DATE_AXIS_COLUMN`] of
//! formatted timestamps plus one float column per series, named after its
//! [`SeriesLabel`]. Each row holds at most one value. A row with no value
//! ends the current line, so every segment of a fading forecast run is drawn
//! on its own in the color of its shade.

use crate::analysis::colored_line::{shade_level, ColoredLine};
use crate::dates::datetime_from_day_number;
use crate::error::ForecastAccuracyError;
use crate::forecasts::Forecasts;
use crate::tables::table::WeatherTable;
use crate::types::alignment::AlignmentRecord;
use crate::types::histogram::ErrorHistogram;
use crate::types::quantity::Quantity;
use log::debug;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

pub const DATE_AXIS_COLUMN: &str = "date";
pub const DAYS_BEFORE_ACTUAL_COLUMN: &str = "days_before_actual";
pub const ERROR_COLUMN: &str = "error";
pub const COUNT_COLUMN: &str = "count";

/// Format of the [`DATE_AXIS_COLUMN`] values.
pub const AXIS_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of distinct shades a fading run is drawn with.
pub const SHADE_LEVELS: usize = 5;
/// Recency divisor of the temperature high/low chart.
pub const HI_LO_DIVISOR: i64 = 8;
/// Recency divisor of single-quantity charts.
pub const SINGLE_QUANTITY_DIVISOR: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extremum {
    Max,
    Min,
}

/// Identifies one series of a line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesLabel {
    /// Forecast points. `shade` is `None` for uniform series.
    Forecast {
        extremum: Option<Extremum>,
        shade: Option<usize>,
    },
    Observed {
        extremum: Option<Extremum>,
    },
}

impl fmt::Display for SeriesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, extremum, shade) = match self {
            SeriesLabel::Forecast { extremum, shade } => ("forecast", extremum, *shade),
            SeriesLabel::Observed { extremum } => ("observed", extremum, None),
        };
        write!(f, "{}", kind)?;
        match extremum {
            Some(Extremum::Max) => write!(f, " max")?,
            Some(Extremum::Min) => write!(f, " min")?,
            None => {}
        }
        if let Some(shade) = shade {
            write!(f, " {}", shade)?;
        }
        Ok(())
    }
}

/// A line chart frame and the labels of its series columns, ordered as the
/// columns are.
#[derive(Debug, Clone)]
pub struct SeriesFrame {
    pub frame: DataFrame,
    pub labels: Vec<SeriesLabel>,
}

#[derive(Default)]
struct SeriesBuilder {
    dates: Vec<String>,
    /// Series and value of each row; `None` marks a line break.
    cells: Vec<Option<(String, f64)>>,
    labels: BTreeMap<String, SeriesLabel>,
}

impl SeriesBuilder {
    fn push(&mut self, day: f64, value: f64, label: SeriesLabel) {
        let Some(datetime) = datetime_from_day_number(day) else {
            debug!("Skipping point at day {} outside the date range", day);
            return;
        };
        let text = label.to_string();
        self.dates.push(datetime.format(AXIS_DATE_FORMAT).to_string());
        self.cells.push(Some((text.clone(), value)));
        self.labels.entry(text).or_insert(label);
    }

    fn push_break(&mut self) {
        if let Some(Some(_)) = self.cells.last() {
            let date = self.dates.last().cloned().unwrap_or_default();
            self.dates.push(date);
            self.cells.push(None);
        }
    }

    /// Consecutive present values form one line; a missing value breaks it.
    fn push_points(&mut self, days: &[f64], values: &[Option<f64>], label: SeriesLabel) {
        for (&day, value) in days.iter().zip(values) {
            match *value {
                Some(value) => self.push(day, value, label),
                None => self.push_break(),
            }
        }
        self.push_break();
    }

    /// Every segment becomes its own line in the series of its shade.
    fn push_fading(
        &mut self,
        days: &[f64],
        values: &[Option<f64>],
        extremum: Option<Extremum>,
        divisor: i64,
    ) {
        let line = ColoredLine::fading(days, values, divisor);
        for (segment, intensity) in line.segments().iter().zip(line.intensities()) {
            let label = SeriesLabel::Forecast {
                extremum,
                shade: Some(shade_level(intensity, SHADE_LEVELS)),
            };
            self.push(segment.start.0, segment.start.1, label);
            self.push(segment.end.0, segment.end.1, label);
            self.push_break();
        }
    }

    fn finish(self) -> PolarsResult<SeriesFrame> {
        let mut columns = Vec::with_capacity(self.labels.len() + 1);
        for text in self.labels.keys() {
            let values: Vec<Option<f64>> = self
                .cells
                .iter()
                .map(|cell| match cell {
                    Some((series, value)) if series == text => Some(*value),
                    _ => None,
                })
                .collect();
            columns.push(Column::new(text.as_str().into(), values));
        }
        columns.insert(0, Column::new(DATE_AXIS_COLUMN.into(), self.dates));

        Ok(SeriesFrame {
            frame: DataFrame::new(columns)?,
            labels: self.labels.into_values().collect(),
        })
    }
}

fn push_run(
    builder: &mut SeriesBuilder,
    run: &WeatherTable,
    quantity: Quantity,
    extremum: Option<Extremum>,
    divisor: i64,
    uniform: bool,
) -> Result<(), ForecastAccuracyError> {
    let values = run.values(quantity)?;
    if uniform {
        let label = SeriesLabel::Forecast {
            extremum,
            shade: None,
        };
        builder.push_points(run.day_numbers(), &values, label);
    } else {
        builder.push_fading(run.day_numbers(), &values, extremum, divisor);
    }
    Ok(())
}

/// Fading maximum and minimum temperature of every run, then the observed
/// extremes.
pub fn temperature_hi_lo_frame(forecasts: &Forecasts) -> Result<SeriesFrame, ForecastAccuracyError> {
    let mut builder = SeriesBuilder::default();
    let bounds = [
        (Quantity::MaximumTemperature, Extremum::Max),
        (Quantity::MinimumTemperature, Extremum::Min),
    ];

    for run in forecasts.forecast_runs() {
        for (quantity, extremum) in bounds {
            push_run(&mut builder, run, quantity, Some(extremum), HI_LO_DIVISOR, false)?;
        }
    }

    let history = forecasts.history();
    for (quantity, extremum) in bounds {
        let observed = history.values(quantity)?;
        builder.push_points(
            history.day_numbers(),
            &observed,
            SeriesLabel::Observed {
                extremum: Some(extremum),
            },
        );
    }

    Ok(builder.finish()?)
}

/// Every run of one quantity plus the observed values. Hourly runs are drawn
/// as one uniform series.
pub fn quantity_frame(
    forecasts: &Forecasts,
    quantity: Quantity,
) -> Result<SeriesFrame, ForecastAccuracyError> {
    let mut builder = SeriesBuilder::default();
    let uniform = forecasts.granularity().is_hourly();

    for run in forecasts.forecast_runs() {
        push_run(&mut builder, run, quantity, None, SINGLE_QUANTITY_DIVISOR, uniform)?;
    }

    let history = forecasts.history();
    let observed = history.values(quantity)?;
    builder.push_points(
        history.day_numbers(),
        &observed,
        SeriesLabel::Observed { extremum: None },
    );

    Ok(builder.finish()?)
}

/// One row per record: how many days before the observation the forecast
/// was issued, and its error.
pub fn relative_scatter_frame(records: &[AlignmentRecord]) -> PolarsResult<DataFrame> {
    let days: Vec<f64> = records.iter().map(AlignmentRecord::days_before_actual).collect();
    let errors: Vec<f64> = records.iter().map(|record| record.error).collect();
    df!(
        DAYS_BEFORE_ACTUAL_COLUMN => days,
        ERROR_COLUMN => errors,
    )
}

/// One row per histogram cell, lead days negated onto the
/// days-before-actual axis and errors at their bin centers.
pub fn histogram_frame(histogram: &ErrorHistogram) -> PolarsResult<DataFrame> {
    let cells = histogram.value_bins() * histogram.lead_days();
    let mut days = Vec::with_capacity(cells);
    let mut errors = Vec::with_capacity(cells);
    let mut counts = Vec::with_capacity(cells);

    for (value_bin, row) in histogram.counts().iter().enumerate() {
        let center = histogram.bin_center(value_bin);
        for (lead_day, &count) in row.iter().enumerate() {
            days.push(-(lead_day as i64));
            errors.push(center);
            counts.push(count);
        }
    }

    df!(
        DAYS_BEFORE_ACTUAL_COLUMN => days,
        ERROR_COLUMN => errors,
        COUNT_COLUMN => counts,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::binning::histogram;
    use crate::tables::table::DATE_COLUMN;
    use crate::types::granularity::Granularity;

    fn daily_table(dates: &[&str], max: &[Option<f64>], min: &[Option<f64>]) -> WeatherTable {
        let frame = df!(
            DATE_COLUMN => dates,
            "Maximum Temperature" => max,
            "Minimum Temperature" => min,
        )
        .unwrap();
        WeatherTable::from_frame(frame, Granularity::Daily, "test").unwrap()
    }

    fn fixture(granularity: Granularity) -> Forecasts {
        let (dates, history_dates): (Vec<&str>, Vec<&str>) = match granularity {
            Granularity::Daily => (
                vec!["01/01/2022", "01/02/2022", "01/03/2022"],
                vec!["01/01/2022", "01/02/2022"],
            ),
            Granularity::Hourly => (
                vec!["01/01/2022 00:00:00", "01/01/2022 01:00:00", "01/01/2022 02:00:00"],
                vec!["01/01/2022 00:00:00", "01/01/2022 01:00:00"],
            ),
        };
        let run_frame = df!(
            DATE_COLUMN => &dates,
            "Maximum Temperature" => [Some(50.0), Some(52.0), Some(53.0)],
            "Minimum Temperature" => [Some(38.0), None, Some(40.0)],
        )
        .unwrap();
        let history_frame = df!(
            DATE_COLUMN => &history_dates,
            "Maximum Temperature" => [Some(51.0), Some(52.0)],
            "Minimum Temperature" => [Some(37.0), Some(39.0)],
        )
        .unwrap();
        Forecasts::from_tables(
            "Orinda",
            granularity,
            WeatherTable::from_frame(history_frame, granularity, "history").unwrap(),
            vec![WeatherTable::from_frame(run_frame, granularity, "run").unwrap()],
        )
    }

    fn series_counts(chart: &SeriesFrame) -> BTreeMap<String, usize> {
        chart
            .labels
            .iter()
            .map(|label| {
                let text = label.to_string();
                let present = chart.frame.column(&text).unwrap().f64().unwrap().into_iter().flatten().count();
                (text, present)
            })
            .collect()
    }

    fn dates(frame: &DataFrame) -> Vec<String> {
        frame
            .column(DATE_AXIS_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|date| date.unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_label_text() {
        let label = SeriesLabel::Forecast {
            extremum: Some(Extremum::Max),
            shade: Some(3),
        };
        assert_eq!(label.to_string(), "forecast max 3");
        let uniform = SeriesLabel::Forecast {
            extremum: None,
            shade: None,
        };
        assert_eq!(uniform.to_string(), "forecast");
        assert_eq!(
            SeriesLabel::Observed {
                extremum: Some(Extremum::Min)
            }
            .to_string(),
            "observed min"
        );
    }

    #[test]
    fn test_hi_lo_frame() {
        let chart = temperature_hi_lo_frame(&fixture(Granularity::Daily)).unwrap();
        let counts = series_counts(&chart);

        // n = 3, norm [-1, 3]: segment values 3 and 2 map to 1.0 and 0.75.
        assert_eq!(counts.get("forecast max 4"), Some(&2));
        assert_eq!(counts.get("forecast max 3"), Some(&2));
        // The missing minimum breaks both segments.
        assert!(!counts.keys().any(|label| label.starts_with("forecast min")));
        assert_eq!(counts.get("observed max"), Some(&2));
        assert_eq!(counts.get("observed min"), Some(&2));

        let texts: Vec<String> = chart.labels.iter().map(ToString::to_string).collect();
        let mut sorted = texts.clone();
        sorted.sort();
        assert_eq!(texts, sorted);
        assert_eq!(texts.len(), counts.len());

        let columns: Vec<String> = chart
            .frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(columns[0], DATE_AXIS_COLUMN);
        assert_eq!(columns[1..], texts[..]);
    }

    #[test]
    fn test_segments_are_separate_lines() {
        let chart = temperature_hi_lo_frame(&fixture(Granularity::Daily)).unwrap();
        // Two max segments of two points plus a break each, then two
        // observed series of two points plus a break each.
        assert_eq!(chart.frame.height(), 6 + 3 + 3);

        let newest: Vec<Option<f64>> = chart
            .frame
            .column("forecast max 4")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(&newest[..4], &[Some(50.0), Some(52.0), None, None]);

        let dates = dates(&chart.frame);
        assert_eq!(dates[0], "2022-01-01 00:00:00");
        assert_eq!(dates[1], "2022-01-02 00:00:00");
        // A break row repeats the date before it.
        assert_eq!(dates[2], dates[1]);
        assert_eq!(dates[3], "2022-01-02 00:00:00");
    }

    #[test]
    fn test_hourly_dates_keep_time_of_day() {
        let chart = quantity_frame(&fixture(Granularity::Hourly), Quantity::MaximumTemperature).unwrap();
        let dates = dates(&chart.frame);
        assert_eq!(dates[..3], ["2022-01-01 00:00:00", "2022-01-01 01:00:00", "2022-01-01 02:00:00"]);
    }

    #[test]
    fn test_missing_value_breaks_observed_line() {
        let history = daily_table(
            &["01/01/2022", "01/02/2022", "01/03/2022"],
            &[Some(50.0), None, Some(52.0)],
            &[Some(38.0), Some(39.0), Some(40.0)],
        );
        let forecasts = Forecasts::from_tables("Orinda", Granularity::Daily, history, vec![]);
        let chart = quantity_frame(&forecasts, Quantity::MaximumTemperature).unwrap();

        let observed: Vec<Option<f64>> = chart
            .frame
            .column("observed")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(observed, vec![Some(50.0), None, Some(52.0), None]);
    }

    #[test]
    fn test_hourly_quantity_is_uniform() {
        let chart = quantity_frame(&fixture(Granularity::Hourly), Quantity::MaximumTemperature).unwrap();
        let counts = series_counts(&chart);
        assert_eq!(counts.get("forecast"), Some(&3));
        assert_eq!(counts.get("observed"), Some(&2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_daily_quantity_fades() {
        let chart = quantity_frame(&fixture(Granularity::Daily), Quantity::MaximumTemperature).unwrap();
        let counts = series_counts(&chart);
        assert!(counts.get("forecast").is_none());
        assert_eq!(counts.values().sum::<usize>(), 4 + 2);
    }

    #[test]
    fn test_missing_quantity_is_error() {
        let forecasts = Forecasts::from_tables(
            "Orinda",
            Granularity::Daily,
            daily_table(&["01/01/2022"], &[Some(1.0)], &[Some(0.0)]),
            vec![],
        );
        assert!(quantity_frame(&forecasts, Quantity::Precipitation).is_err());
    }

    #[test]
    fn test_relative_scatter_frame() {
        let records = [AlignmentRecord::new(2.0, 5.0), AlignmentRecord::new(0.0, -1.0)];
        let frame = relative_scatter_frame(&records).unwrap();
        let days: Vec<Option<f64>> = frame
            .column(DAYS_BEFORE_ACTUAL_COLUMN)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(days, vec![Some(-2.0), Some(0.0)]);
    }

    #[test]
    fn test_histogram_frame() {
        let records = [AlignmentRecord::new(2.0, 5.0)];
        let hist = histogram(&records, 2, 3).unwrap();
        let frame = histogram_frame(&hist).unwrap();
        assert_eq!(frame.height(), 2 * 4);

        let total: u32 = frame
            .column(COUNT_COLUMN)
            .unwrap()
            .u32()
            .unwrap()
            .into_iter()
            .flatten()
            .sum();
        assert_eq!(total, 1);
    }
}
