//! Error types for balju-core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when a sheet does not have the shape the catalog expects
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column is missing from the header row
    #[error("Column '{0}' not found")]
    MissingColumn(String),
}

/// Errors that reject an add-order request
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddError {
    /// The product code (barcode) field was empty
    #[error("Product code is required")]
    MissingCode,
}

/// Errors that abort an export. The order list is never modified by a failed export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export
    #[error("No order items to export")]
    EmptyOrderList,

    /// Binary-append mode requires the target workbook to exist
    #[error("Target workbook does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    /// No automation host is available on this platform or installation
    #[error("Workbook automation unavailable: {0}")]
    AutomationUnavailable(String),

    /// The automation host reported a failure
    #[error("Workbook automation failed: {0}")]
    Automation(String),

    /// The spreadsheet writer failed
    #[error("Failed to write order form: {0}")]
    Write(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
