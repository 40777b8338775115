//! Aggregates alignment records into an [`ErrorHistogram`].

use crate::analysis::error::HistogramError;
use crate::types::alignment::AlignmentRecord;
use crate::types::histogram::ErrorHistogram;

pub const DEFAULT_VALUE_BINS: usize = 20;
pub const DEFAULT_MAX_LEAD_DAYS: u32 = 14;

/// Fraction of the error range added above the largest error, so the largest
/// error falls inside the last bin under floor division.
const UPPER_EXPANSION: f64 = 1.0 / 1000.0;

/// Buckets records by rounded lead day and by error.
///
/// The error range always includes zero: it starts as `[0, 0]` and widens to
/// the smallest and largest error seen. Records whose lead time rounds to a
/// day outside `0..=max_lead_days` are left out.
///
/// # Errors
///
/// * [`HistogramError::NoValueBins`] when `value_bins` is zero.
/// * [`HistogramError::InsufficientData`] when the error range has no spread,
///   which includes an empty record set.
///
/// # Examples
///
/// ```
/// use forecast_accuracy::{histogram, AlignmentRecord};
///
/// let records = [AlignmentRecord::new(2.0, 5.0)];
/// let hist = histogram(&records, 1, 5).unwrap();
/// assert_eq!(hist.count(0, 2), Some(1));
/// assert_eq!(hist.total(), 1);
/// ```
pub fn histogram(
    records: &[AlignmentRecord],
    value_bins: usize,
    max_lead_days: u32,
) -> Result<ErrorHistogram, HistogramError> {
    if value_bins == 0 {
        return Err(HistogramError::NoValueBins);
    }

    let (min_error, max_error) = records
        .iter()
        .fold((0.0_f64, 0.0_f64), |(low, high), record| {
            (low.min(record.error), high.max(record.error))
        });

    let spread = max_error - min_error;
    // Also rejects a NaN spread.
    if !(spread > 0.0) {
        return Err(HistogramError::InsufficientData {
            records: records.len(),
            min_error,
            max_error,
        });
    }

    let max_error = max_error + spread * UPPER_EXPANSION;
    let bin_width = (max_error - min_error) / value_bins as f64;

    let mut counts = vec![vec![0u32; max_lead_days as usize + 1]; value_bins];
    for record in records {
        let Some(lead_day) = lead_day(record.lead_time_days, max_lead_days) else {
            continue;
        };
        let value_bin = (((record.error - min_error) / bin_width).floor() as usize).min(value_bins - 1);
        counts[value_bin][lead_day] += 1;
    }

    Ok(ErrorHistogram {
        counts,
        min_error,
        max_error,
        bin_width,
        max_lead_days,
    })
}

/// Rounds a lead time to the nearest whole day, halves rounding up.
fn lead_day(lead_time_days: f64, max_lead_days: u32) -> Option<usize> {
    let day = (lead_time_days + 0.5).floor();
    if day < 0.0 || day > f64::from(max_lead_days) {
        None
    } else {
        Some(day as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(f64, f64)]) -> Vec<AlignmentRecord> {
        pairs
            .iter()
            .map(|&(lead, error)| AlignmentRecord::new(lead, error))
            .collect()
    }

    #[test]
    fn test_single_record_end_to_end() {
        let hist = histogram(&records(&[(2.0, 5.0)]), 1, 5).unwrap();
        assert_eq!(hist.value_bins(), 1);
        assert_eq!(hist.lead_days(), 6);
        for lead in 0..6 {
            let expected = if lead == 2 { 1 } else { 0 };
            assert_eq!(hist.count(0, lead), Some(expected));
        }
    }

    #[test]
    fn test_range_includes_zero() {
        let hist = histogram(&records(&[(1.0, 2.0), (1.0, 3.0), (1.0, 5.0)]), 4, 3).unwrap();
        let (min, max) = hist.error_range();
        assert_eq!(min, 0.0);
        assert!((max - 5.005).abs() < 1e-12);

        let hist = histogram(&records(&[(1.0, -4.0), (1.0, -1.0)]), 4, 3).unwrap();
        let (min, max) = hist.error_range();
        assert_eq!(min, -4.0);
        assert!((max - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_max_error_lands_in_last_bin() {
        let hist = histogram(&records(&[(0.0, 0.5), (0.0, 10.0)]), 10, 0).unwrap();
        assert_eq!(hist.count(9, 0), Some(1));
        assert_eq!(hist.count(0, 0), Some(1));
        assert_eq!(hist.total(), 2);
    }

    #[test]
    fn test_min_error_lands_in_first_bin() {
        let hist = histogram(&records(&[(0.0, -3.0), (0.0, 3.0)]), 3, 0).unwrap();
        assert_eq!(hist.count(0, 0), Some(1));
        assert_eq!(hist.count(2, 0), Some(1));
    }

    #[test]
    fn test_coverage_drops_out_of_window_leads() {
        let input = records(&[
            (0.0, 1.0),
            (0.4, 1.0),  // rounds to 0
            (0.5, 1.0),  // rounds to 1
            (3.49, 1.0), // rounds to 3
            (3.5, 2.0),  // rounds to 4, dropped
            (10.0, 2.0), // dropped
            (-0.6, 2.0), // rounds to -1, dropped
        ]);
        let hist = histogram(&input, 5, 3).unwrap();

        let in_window = input
            .iter()
            .filter(|r| {
                let day = (r.lead_time_days + 0.5).floor();
                (0.0..=3.0).contains(&day)
            })
            .count() as u64;
        assert_eq!(hist.total(), in_window);
        assert_eq!(hist.total(), 4);
        assert_eq!(hist.counts().iter().map(|row| row[0]).sum::<u32>(), 2);
        assert_eq!(hist.counts().iter().map(|row| row[1]).sum::<u32>(), 1);
        assert_eq!(hist.counts().iter().map(|row| row[3]).sum::<u32>(), 1);
    }

    #[test]
    fn test_dropped_records_still_widen_range() {
        let hist = histogram(&records(&[(1.0, 1.0), (30.0, 9.0)]), 2, 14).unwrap();
        let (_, max) = hist.error_range();
        assert!(max > 9.0);
        assert_eq!(hist.total(), 1);
    }

    #[test]
    fn test_zero_spread_is_insufficient() {
        let err = histogram(&records(&[(1.0, 0.0), (2.0, 0.0)]), 20, 14).unwrap_err();
        assert!(matches!(err, HistogramError::InsufficientData { records: 2, .. }));

        let err = histogram(&[], 20, 14).unwrap_err();
        assert!(matches!(err, HistogramError::InsufficientData { records: 0, .. }));
    }

    #[test]
    fn test_zero_bins_rejected() {
        let err = histogram(&records(&[(1.0, 1.0)]), 0, 14).unwrap_err();
        assert!(matches!(err, HistogramError::NoValueBins));
    }

    #[test]
    fn test_bin_geometry() {
        let hist = histogram(&records(&[(0.0, 10.0)]), 4, 1).unwrap();
        assert!((hist.bin_width() - 10.01 / 4.0).abs() < 1e-12);
        let (low, high) = hist.bin_edges(1);
        assert!((low - hist.bin_width()).abs() < 1e-12);
        assert!((high - 2.0 * hist.bin_width()).abs() < 1e-12);
        assert!((hist.bin_center(0) - hist.bin_width() / 2.0).abs() < 1e-12);
    }
}
