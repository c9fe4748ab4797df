//! Referential pass: every trigger name used by a tag must exist.

use std::collections::HashSet;

use gtm_model::CanonicalDocument;

use crate::error::{DanglingReference, Result, ValidationError};

/// Collects every dangling reference instead of stopping at the first.
pub fn check_references(doc: &CanonicalDocument) -> Result<()> {
    let known: HashSet<&str> = doc
        .triggers
        .iter()
        .map(|trigger| trigger.name.as_str())
        .collect();

    let mut dangling = Vec::new();
    for tag in &doc.tags {
        for (role, trigger) in tag.trigger_references() {
            if !known.contains(trigger) {
                dangling.push(DanglingReference {
                    tag: tag.name.clone(),
                    role,
                    trigger: trigger.to_string(),
                });
            }
        }
    }

    if dangling.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DanglingReferences(dangling))
    }
}
