//! XLSX error types

use std::path::PathBuf;

use balju_core::ExportError;
use thiserror::Error;

/// Result type for XLSX writing
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while writing an XLSX file
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Sheet that cannot be written
    #[error("Invalid sheet: {0}")]
    InvalidSheet(String),
}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        match err {
            XlsxError::Io(e) => ExportError::Io(e),
            other => ExportError::Write(other.to_string()),
        }
    }
}

/// Errors that can occur while loading the master catalog
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The master file does not exist
    #[error("Master file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The workbook could not be opened
    #[error("Failed to open workbook '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// A required sheet is missing
    #[error("Sheet '{0}' not found in master workbook")]
    MissingSheet(String),

    /// A sheet exists but could not be read
    #[error("Failed to read sheet '{sheet}': {source}")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    /// The header row lacks a required column
    #[error("Column '{column}' not found in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },
}
