//! Validation of canonical tag documents.
//!
//! Two passes run in order and both must pass: a structural pass that stops
//! at the first violation, then a referential pass that reports every tag
//! naming a trigger absent from the document. Nothing here talks to the
//! remote service.

mod error;
mod references;
mod structural;

use gtm_model::CanonicalDocument;

pub use error::{DanglingReference, Result, ValidationError};
pub use references::check_references;
pub use structural::check_structure;

/// Runs the structural then the referential pass.
pub fn validate(doc: &CanonicalDocument) -> Result<()> {
    check_structure(doc).inspect_err(|err| {
        tracing::error!(error = %err, "input data validation failed");
    })?;
    check_references(doc).inspect_err(|err| {
        tracing::error!(error = %err, "trigger reference validation failed");
    })?;
    tracing::info!("input data validation passed");
    Ok(())
}
