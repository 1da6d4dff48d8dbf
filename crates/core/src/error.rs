//! Error types for the trade-plotter system.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the trade-plotter system.
#[derive(Error, Debug)]
pub enum Error {
    /// The CSV header lacks one or more required columns.
    #[error("Missing required columns: {missing:?} (available columns: {found:?})")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// Input file does not exist.
    #[error("File '{}' not found", .0.display())]
    FileNotFound(PathBuf),

    /// Time cell is neither `HH:MM:SS` nor `HH:MM`.
    #[error("Could not parse time '{0}'")]
    InvalidTime(String),

    /// Date cell matches none of the supported formats.
    #[error("Could not parse date '{0}'")]
    InvalidDate(String),

    /// Order identifier does not encode a `YYMMDD` date.
    #[error("Could not parse date from order identifier '{0}'")]
    InvalidIdentifier(String),

    /// Filtering left nothing to render.
    #[error("No trades found for symbol {0}")]
    NoTrades(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// CSV decoding error.
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a CSV error.
    pub fn csv(msg: impl Into<String>) -> Self {
        Error::Csv(msg.into())
    }

    /// Create an invalid time error.
    pub fn invalid_time(text: impl Into<String>) -> Self {
        Error::InvalidTime(text.into())
    }

    /// Create an invalid date error.
    pub fn invalid_date(text: impl Into<String>) -> Self {
        Error::InvalidDate(text.into())
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier(text: impl Into<String>) -> Self {
        Error::InvalidIdentifier(text.into())
    }

    /// True for failures that only concern a single CSV row.
    pub fn is_row_local(&self) -> bool {
        matches!(
            self,
            Error::InvalidTime(_) | Error::InvalidDate(_) | Error::InvalidIdentifier(_)
        )
    }
}
