// src/error.rs

//! Error kinds raised while loading, transforming and rendering results.
//!
//! Every variant is recoverable: the session turns them into status messages
//! and keeps the current state intact.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    /// Empty path or a path without the `.csv` extension.
    #[error("Error: {0}")]
    InvalidFilename(String),

    #[error("Error: file {} was not found", .0.display())]
    FileNotFound(PathBuf),

    /// A required numeric field could not be parsed.
    #[error("Error: row {row}: column '{column}' is not numeric: '{value}'")]
    ParseError {
        row: usize,
        column: &'static str,
        value: String,
    },

    /// Timestamp that is neither an epoch value nor a date-time string.
    #[error("Error: unrecognized timestamp '{0}'")]
    FormatError(String),

    #[error("Error: {0}")]
    InvalidWindowValue(String),

    #[error("Error: file contains no data rows")]
    EmptyDataset,

    #[error("Error: no results file loaded")]
    NoDataLoaded,

    #[error("Error: {0}")]
    InvalidCommand(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(String),
}

impl GraphError {
    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphError::InvalidFilename(_) => "InvalidFilename",
            GraphError::FileNotFound(_) => "FileNotFound",
            GraphError::ParseError { .. } => "ParseError",
            GraphError::FormatError(_) => "FormatError",
            GraphError::InvalidWindowValue(_) => "InvalidWindowValue",
            GraphError::EmptyDataset => "EmptyDataset",
            GraphError::NoDataLoaded => "NoDataLoaded",
            GraphError::InvalidCommand(_) => "InvalidCommand",
            GraphError::Csv(_) => "Csv",
            GraphError::Io(_) => "Io",
            GraphError::Render(_) => "Render",
        }
    }
}

// src/error.rs
