//! Error types for the core deduplication engine

use thiserror::Error;

/// Core deduplication errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No key column was supplied by the caller
    #[error("no key column specified")]
    MissingKeyColumn,

    /// The key column is not part of the table's column set
    #[error("table does not contain column '{0}'")]
    MissingColumn(String),

    /// Failure raised by the CSV decoder before the engine ran
    #[error("failed to decode input: {0}")]
    UpstreamDecode(String),

    /// Raised while building a table, never by deduplication
    #[error("row at line {line} has {found} fields, expected {expected}")]
    RowWidthMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
