//! Custom error types for the exporter.

use thiserror::Error;

/// Export pipeline errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("API error: {0}")]
    Api(#[from] strava_client::StravaError),

    #[error("{0} can not be empty")]
    MissingCredential(&'static str),

    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
