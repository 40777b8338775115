use crate::config::ConfigError;
use crate::tables::error::TableError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Reading the response body failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Provider quota exceeded while collecting {location}: {message}")]
    QuotaExceeded { location: String, message: String },

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to write table file '{0}'")]
    FileWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to read existing history")]
    History(#[from] TableError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
