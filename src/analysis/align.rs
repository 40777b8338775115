//! Pairs every observation with the forecasts that predicted it.

use crate::tables::error::TableError;
use crate::tables::table::WeatherTable;
use crate::types::alignment::AlignmentRecord;
use crate::types::quantity::Quantity;
use log::debug;
use std::collections::HashMap;

/// A forecast run prepared for key lookups.
struct IndexedRun<'a> {
    issued: f64,
    first_rows: HashMap<&'a str, usize>,
    values: Vec<Option<f64>>,
}

impl<'a> IndexedRun<'a> {
    fn new(run: &'a WeatherTable, quantity: Quantity) -> Result<Option<Self>, TableError> {
        let Some(issued) = run.issued_day_number() else {
            return Ok(None);
        };

        let mut first_rows = HashMap::with_capacity(run.len());
        for (row, key) in run.date_keys().iter().enumerate() {
            // Duplicate keys keep the earliest row.
            first_rows.entry(key.as_str()).or_insert(row);
        }

        Ok(Some(Self {
            issued,
            first_rows,
            values: run.values(quantity)?,
        }))
    }

    fn value_at(&self, key: &str) -> Option<Option<f64>> {
        self.first_rows.get(key).map(|&row| self.values[row])
    }
}

/// Computes one [`AlignmentRecord`] per (observation, forecast run) pair whose
/// raw `Date time` keys match exactly.
///
/// Observations are visited in table order and runs in the order given. The
/// lead time is measured from each run's first row, which is the day the run
/// was issued, to the observation. Only the first matching row of a run is
/// used. Pairs where either value is missing are skipped.
///
/// # Errors
///
/// Returns a [`TableError`] if the quantity column is missing or not numeric
/// in the history table or in any forecast run.
pub fn align(
    history: &WeatherTable,
    forecast_runs: &[WeatherTable],
    quantity: Quantity,
) -> Result<Vec<AlignmentRecord>, TableError> {
    let observed = history.values(quantity)?;

    let mut runs = Vec::with_capacity(forecast_runs.len());
    for run in forecast_runs {
        if let Some(indexed) = IndexedRun::new(run, quantity)? {
            runs.push(indexed);
        }
    }

    let mut records = Vec::new();
    let observations = history
        .date_keys()
        .iter()
        .zip(history.day_numbers())
        .zip(&observed);

    for ((key, &day), &actual) in observations {
        for run in &runs {
            let Some(forecast) = run.value_at(key) else {
                continue;
            };
            match (forecast, actual) {
                (Some(forecast), Some(actual)) => {
                    records.push(AlignmentRecord::new(day - run.issued, forecast - actual));
                }
                _ => debug!("Skipping {} on {}: missing value", quantity, key),
            }
        }
    }

    debug!(
        "Aligned {} {} records from {} observations and {} runs",
        records.len(),
        quantity,
        history.len(),
        runs.len()
    );
    Ok(records)
}
