//! JSON input: canonical passthrough or container export conversion.

use gtm_model::CanonicalDocument;
use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::export::convert_export;

/// Top-level key marking a container export.
pub const EXPORT_ROOT_KEY: &str = "containerVersion";

const CANONICAL_KEYS: [&str; 3] = ["variables", "triggers", "tags"];

pub(crate) fn normalize_json(raw: &[u8]) -> Result<CanonicalDocument> {
    let value: Value = serde_json::from_slice(raw)?;
    normalize_value(value)
}

/// Normalizes an already-parsed JSON value.
pub fn normalize_value(value: Value) -> Result<CanonicalDocument> {
    let Value::Object(root) = &value else {
        return Err(IngestError::UnrecognizedDocument {
            reason: format!("expected a JSON object, found {}", value_kind(&value)),
        });
    };

    if let Some(version) = root.get(EXPORT_ROOT_KEY) {
        tracing::info!("detected container export format, converting");
        return convert_export(version);
    }

    if CANONICAL_KEYS.iter().any(|key| root.contains_key(*key)) {
        return Ok(serde_json::from_value(value)?);
    }

    Err(IngestError::UnrecognizedDocument {
        reason: format!(
            "expected '{EXPORT_ROOT_KEY}' or at least one of 'variables', 'triggers', 'tags'"
        ),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
