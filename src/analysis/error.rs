use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("At least one value bin is required")]
    NoValueBins,

    #[error("Insufficient data for a histogram: {records} records with errors spanning [{min_error}, {max_error}]")]
    InsufficientData {
        records: usize,
        min_error: f64,
        max_error: f64,
    },
}
