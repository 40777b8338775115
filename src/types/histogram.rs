//! The 2-D count matrix produced by binning alignment records.

/// Counts of alignment records per (error bin, lead day) cell.
///
/// The error axis spans `[min_error, max_error]` split into `value_bins` equal
/// bins, where `max_error` already includes the small expansion applied during
/// binning. The lead axis spans whole days `0..=max_lead_days`.
///
/// Instances are produced by [`crate::histogram`] or
/// [`crate::Forecasts::relative_histogram`].
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorHistogram {
    pub(crate) counts: Vec<Vec<u32>>,
    pub(crate) min_error: f64,
    pub(crate) max_error: f64,
    pub(crate) bin_width: f64,
    pub(crate) max_lead_days: u32,
}

impl ErrorHistogram {
    /// Count matrix indexed as `counts()[value_bin][lead_day]`.
    pub fn counts(&self) -> &[Vec<u32>] {
        &self.counts
    }

    /// Returns the count of a single cell, or `None` when out of range.
    pub fn count(&self, value_bin: usize, lead_day: usize) -> Option<u32> {
        self.counts.get(value_bin)?.get(lead_day).copied()
    }

    pub fn value_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn max_lead_days(&self) -> u32 {
        self.max_lead_days
    }

    /// Number of columns on the lead axis (`max_lead_days + 1`).
    pub fn lead_days(&self) -> usize {
        self.max_lead_days as usize + 1
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Lower and (expanded) upper bound of the error axis.
    pub fn error_range(&self) -> (f64, f64) {
        (self.min_error, self.max_error)
    }

    /// Lower and upper edge of a value bin.
    pub fn bin_edges(&self, value_bin: usize) -> (f64, f64) {
        let low = self.min_error + value_bin as f64 * self.bin_width;
        (low, low + self.bin_width)
    }

    pub fn bin_center(&self, value_bin: usize) -> f64 {
        let (low, high) = self.bin_edges(value_bin);
        (low + high) / 2.0
    }

    /// Total number of binned records.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .flat_map(|row| row.iter())
            .map(|&count| u64::from(count))
            .sum()
    }
}
