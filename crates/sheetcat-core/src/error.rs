//! Error types for sheetcat-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetcat-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to open or read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Spreadsheet could not be opened or decoded
    #[error("failed to read workbook '{path}': {message}")]
    Workbook { path: PathBuf, message: String },

    /// The requested header row does not exist or holds no labels
    #[error("no header labels found at row {row} in '{path}'")]
    HeaderRow { path: PathBuf, row: usize },

    /// File extension is not one of the recognized tabular formats
    #[error("unsupported file format: '{path}'")]
    UnsupportedFormat { path: PathBuf },

    /// Two header labels normalize to the same canonical label
    #[error("duplicate column '{label}' after normalization in '{path}'")]
    DuplicateColumn { path: PathBuf, label: String },

    /// A required column is absent from a loaded table
    #[error("column '{label}' not found in '{path}'")]
    ColumnMissing { path: PathBuf, label: String },

    /// No discovered file yielded a readable header row
    #[error("no file with a readable header row; nothing to merge")]
    NoBaseline,

    /// Failed to write the output workbook
    #[error("failed to write workbook '{path}': {message}")]
    WorkbookWrite { path: PathBuf, message: String },

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
