//! Error types for the `spillover-data` crate.

use std::path::PathBuf;

/// Errors from frame operations and delimited I/O.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A delimited file is malformed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A column does not have one value per row.
    #[error("column '{column}' has {actual} values, frame has {expected} rows")]
    LengthMismatch {
        /// The offending column.
        column: String,
        /// Rows in the frame.
        expected: usize,
        /// Values in the column.
        actual: usize,
    },

    /// A referenced column does not exist.
    #[error("no column named '{0}'")]
    MissingColumn(String),

    /// A column was used as numeric but holds text.
    #[error("column '{0}' is not numeric")]
    NotNumeric(String),

    /// A column was used as text but holds numbers.
    #[error("column '{0}' is not text")]
    NotText(String),

    /// A column name is already taken.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Serializing sample metadata failed.
    #[error("metadata serialization failed: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The input contained no header row.
    #[error("delimited input is empty")]
    Empty,
}
