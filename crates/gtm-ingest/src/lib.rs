//! Tag-configuration ingestion.
//!
//! Converts the two supported input encodings into one
//! [`CanonicalDocument`]:
//!
//! - **JSON**: either already canonical (`{variables, triggers, tags}`) or a
//!   container export keyed by `containerVersion`
//! - **Spreadsheet** (`.xlsx` / `.xls`): optional `Variables`, `Triggers` and
//!   `Tags` sheets, one resource per row
//!
//! The encoding is chosen from the file extension only.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use gtm_ingest::load_document;
//!
//! let doc = load_document(Path::new("input/tags.xlsx"))?;
//! println!("{} tags", doc.tags.len());
//! ```

mod error;
mod export;
mod format;
mod json;
mod rows;
mod sheet;

use std::path::Path;

use gtm_model::CanonicalDocument;

// === Error Types ===
pub use error::{IngestError, Result};

// === Format Selection ===
pub use format::SourceFormat;

// === JSON ===
pub use json::{EXPORT_ROOT_KEY, normalize_value};

// === Spreadsheet ===
pub use rows::{
    LIST_SEPARATOR, columns, event_equals_filter, pair_parameters, parse_tags, parse_triggers,
    parse_variables, split_filter_parameters, split_names,
};
pub use sheet::{SheetRecord, SheetTable, TAGS_SHEET, TRIGGERS_SHEET, VARIABLES_SHEET};

/// Normalizes raw input bytes of a known encoding.
pub fn normalize(raw: &[u8], format: SourceFormat) -> Result<CanonicalDocument> {
    let doc = match format {
        SourceFormat::Json => json::normalize_json(raw)?,
        SourceFormat::Spreadsheet => normalize_workbook(raw)?,
    };
    let counts = doc.counts();
    tracing::info!(
        %format,
        variables = counts.variables,
        triggers = counts.triggers,
        tags = counts.tags,
        "input normalized"
    );
    Ok(doc)
}

/// Reads and normalizes a file, choosing the encoding from its extension.
pub fn load_document(path: &Path) -> Result<CanonicalDocument> {
    let format = SourceFormat::from_path(path)?;
    let raw = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    tracing::debug!(path = %path.display(), bytes = raw.len(), "input read");
    normalize(&raw, format)
}

fn normalize_workbook(raw: &[u8]) -> Result<CanonicalDocument> {
    let workbook = sheet::read_workbook(raw)?;
    Ok(CanonicalDocument {
        variables: workbook
            .variables
            .as_ref()
            .map(parse_variables)
            .unwrap_or_default(),
        triggers: workbook
            .triggers
            .as_ref()
            .map(parse_triggers)
            .unwrap_or_default(),
        tags: workbook.tags.as_ref().map(parse_tags).unwrap_or_default(),
    })
}
