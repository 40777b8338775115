//! Interactive charts rendered with `plotlars`.
//!
//! Each function builds its frame from [`crate::chart_data`] and opens the
//! figure in the browser.

use crate::chart_data::{
    self, Extremum, SeriesFrame, SeriesLabel, COUNT_COLUMN, DATE_AXIS_COLUMN,
    DAYS_BEFORE_ACTUAL_COLUMN, ERROR_COLUMN, SHADE_LEVELS,
};
use crate::error::ForecastAccuracyError;
use crate::forecasts::Forecasts;
use crate::types::quantity::Quantity;
use log::{info, warn};
use plotlars::{HeatMap, Line, Plot, Rgb, ScatterPlot, Text, TimeSeriesPlot};

const REDS: (Rgb, Rgb) = (Rgb(252, 187, 161), Rgb(165, 15, 21));
const BLUES: (Rgb, Rgb) = (Rgb(198, 219, 239), Rgb(8, 48, 107));
const OBSERVED_MAX: Rgb = Rgb(191, 0, 191);
const OBSERVED_MIN: Rgb = Rgb(0, 191, 191);

/// Shade `level` of a light-to-dark ramp.
fn ramp((light, dark): (Rgb, Rgb), level: usize) -> Rgb {
    let t = if SHADE_LEVELS > 1 {
        level.min(SHADE_LEVELS - 1) as f64 / (SHADE_LEVELS - 1) as f64
    } else {
        1.0
    };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb(mix(light.0, dark.0), mix(light.1, dark.1), mix(light.2, dark.2))
}

fn label_color(label: &SeriesLabel) -> Rgb {
    match *label {
        SeriesLabel::Forecast {
            extremum: Some(Extremum::Min),
            shade,
        } => ramp(BLUES, shade.unwrap_or(SHADE_LEVELS - 1)),
        SeriesLabel::Forecast { shade, .. } => ramp(REDS, shade.unwrap_or(SHADE_LEVELS - 1)),
        SeriesLabel::Observed {
            extremum: Some(Extremum::Min),
        } => OBSERVED_MIN,
        SeriesLabel::Observed { .. } => OBSERVED_MAX,
    }
}

/// Draws every series column as a line over the date axis.
fn plot_series(chart: &SeriesFrame, location: &str, y_title: &str) {
    let names: Vec<String> = chart.labels.iter().map(ToString::to_string).collect();
    let Some((first, rest)) = names.split_first() else {
        warn!("No values to plot for {}", location);
        return;
    };
    let colors: Vec<Rgb> = chart.labels.iter().map(label_color).collect();
    let lines: Vec<Line> = chart.labels.iter().map(|_| Line::Solid).collect();
    let title = format!("All data for {}", location);

    TimeSeriesPlot::builder()
        .data(&chart.frame)
        .x(DATE_AXIS_COLUMN)
        .y(first.as_str())
        .additional_series(rest.iter().map(String::as_str).collect())
        .colors(colors)
        .lines(lines)
        .width(2.0)
        .plot_title(Text::from(title.as_str()).size(18))
        .x_title("Date")
        .y_title(y_title)
        .build()
        .plot();
}

/// Forecast and observed maximum and minimum temperature over time.
pub fn plot_temperature_hi_lo(forecasts: &Forecasts) -> Result<(), ForecastAccuracyError> {
    let chart = chart_data::temperature_hi_lo_frame(forecasts)?;
    info!("Plotting temperature extremes for {}", forecasts.location());
    plot_series(&chart, forecasts.location(), "Temperature extremum");
    Ok(())
}

/// Forecast and observed values of one quantity over time.
pub fn plot_quantity(forecasts: &Forecasts, quantity: Quantity) -> Result<(), ForecastAccuracyError> {
    let chart = chart_data::quantity_frame(forecasts, quantity)?;
    info!("Plotting {} for {}", quantity, forecasts.location());
    plot_series(&chart, forecasts.location(), quantity.column_name());
    Ok(())
}

/// Scatter of every forecast error against how early it was issued.
pub fn plot_relative(forecasts: &Forecasts, quantity: Quantity) -> Result<(), ForecastAccuracyError> {
    let records = forecasts.align(quantity)?;
    let frame = chart_data::relative_scatter_frame(&records)?;
    let title = format!("All data for {}", forecasts.location());
    info!("Plotting {} relative {} records", records.len(), quantity);

    ScatterPlot::builder()
        .data(&frame)
        .x(DAYS_BEFORE_ACTUAL_COLUMN)
        .y(ERROR_COLUMN)
        .size(6)
        .plot_title(Text::from(title.as_str()).size(18))
        .x_title("Days before actual")
        .y_title(format!("Relative {}", quantity).as_str())
        .build()
        .plot();
    Ok(())
}

/// Heat map of forecast error counts per lead day.
pub fn plot_relative_histogram(
    forecasts: &Forecasts,
    quantity: Quantity,
) -> Result<(), ForecastAccuracyError> {
    let histogram = forecasts.relative_histogram().quantity(quantity).call()?;
    let frame = chart_data::histogram_frame(&histogram)?;
    let title = format!("All data for {}", forecasts.location());
    info!(
        "Plotting {} histogram of {} records",
        quantity,
        histogram.total()
    );

    HeatMap::builder()
        .data(&frame)
        .x(DAYS_BEFORE_ACTUAL_COLUMN)
        .y(ERROR_COLUMN)
        .z(COUNT_COLUMN)
        .plot_title(Text::from(title.as_str()).size(18))
        .x_title("Days before actual")
        .y_title(format!("Relative {}", quantity).as_str())
        .build()
        .plot();
    Ok(())
}

/// The chart set for a granularity: hourly data gets the temperature chart
/// only; daily data gets humidity, precipitation, the maximum temperature
/// histogram and scatter, and the high/low chart.
pub fn plot_all(forecasts: &Forecasts) -> Result<(), ForecastAccuracyError> {
    if forecasts.granularity().is_hourly() {
        return plot_quantity(forecasts, Quantity::Temperature);
    }
    plot_quantity(forecasts, Quantity::RelativeHumidity)?;
    plot_quantity(forecasts, Quantity::Precipitation)?;
    plot_relative_histogram(forecasts, Quantity::MaximumTemperature)?;
    plot_relative(forecasts, Quantity::MaximumTemperature)?;
    plot_temperature_hi_lo(forecasts)
}
