//! Export error types

use thiserror::Error;

/// Errors that can occur while exporting or reading back CSV
#[derive(Error, Debug)]
pub enum ExportError {
    /// The date filter left nothing to export
    #[error("No readings in the selected time range")]
    EmptyExport,

    /// A range bound could not be parsed
    #[error("Cannot parse time: {0}")]
    InvalidBound(String),

    /// A CSV row could not be read back
    #[error("Line {line}: {message}")]
    InvalidRow { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;
