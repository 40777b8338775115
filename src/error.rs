use crate::analysis::error::HistogramError;
use crate::collect::error::CollectError;
use crate::config::ConfigError;
use crate::tables::error::TableError;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForecastAccuracyError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Histogram(#[from] HistogramError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build chart data: {0}")]
    ChartData(#[from] PolarsError),
}
