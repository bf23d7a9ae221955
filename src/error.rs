//! Error types for the sheetdump library.

use std::io;
use thiserror::Error;

/// Result type alias for sheetdump operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting a workbook.
///
/// All errors are terminal: the tool is a one-shot conversion with no
/// resumable state, so every failure aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a parseable XLSX workbook.
    #[error("invalid workbook: {0}")]
    Format(String),

    /// The requested sheet does not exist in the workbook.
    #[error("sheet not found: {0:?}")]
    SheetNotFound(String),

    /// Error serializing output JSON.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Format(format!("ZIP archive error: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Format(format!("XML parse error: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
