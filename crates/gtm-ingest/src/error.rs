//! Error types for input ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or normalizing an input document.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension matches no supported encoding.
    #[error("Unsupported file format: {extension}. Use .json, .xlsx, or .xls")]
    UnsupportedFormat { extension: String },

    // === JSON Errors ===
    /// Input is not well-formed JSON, or a field has the wrong type.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but is neither the canonical nor the export form.
    #[error("unrecognized JSON document: {reason}")]
    UnrecognizedDocument { reason: String },

    /// The export form is present but malformed.
    #[error("invalid container export: {reason}")]
    Export { reason: String },

    // === Spreadsheet Errors ===
    /// Workbook could not be opened or a sheet could not be read.
    #[error("failed to read spreadsheet: {message}")]
    Spreadsheet { message: String },
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
