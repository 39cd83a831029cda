//! Error types for format readers and writers

use thiserror::Error;

/// Format errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table error: {0}")]
    Table(#[from] csvdedup_core::Error),

    #[error("No columns to parse from file")]
    EmptyInput,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for csvdedup_core::Error {
    /// Decode failures reach the engine's caller as `UpstreamDecode`
    fn from(err: Error) -> Self {
        match err {
            Error::Table(inner) => inner,
            other => csvdedup_core::Error::UpstreamDecode(other.to_string()),
        }
    }
}
