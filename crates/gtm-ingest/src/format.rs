//! Input encoding selection.

use std::fmt;
use std::path::Path;

use crate::error::{IngestError, Result};

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Canonical document or container export.
    Json,
    /// Workbook with `Variables`, `Triggers` and `Tags` sheets.
    Spreadsheet,
}

impl SourceFormat {
    /// Maps a file extension (with or without the dot) to a format.
    ///
    /// Matching is case-insensitive. Content is never sniffed.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Self::Json),
            "xlsx" | "xls" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension).ok_or_else(|| IngestError::UnsupportedFormat {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{}", extension.to_ascii_lowercase())
            },
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
