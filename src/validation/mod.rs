//! Validation functionality
//!
//! A bundled document is checked in three layers, and every violation found
//! is reported together:
//! - Structure: discriminator, `info`, `paths`, operations and schema
//!   containers (always on)
//! - Meta-schema: the embedded JSON Schema for the document's version
//!   (`schema-validation` feature)
//! - Reference closure: every remaining `$ref` is internal and resolves
//!
//! Input validation (sizes, names, ids) lives in [`input`].

pub mod input;
pub mod meta_schema;
pub mod references;
pub mod structure;

pub use input::{
    InputError, sanitize_spec_name, validate_document_size, validate_record_id,
    validate_spec_name,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::models::{BundledDocument, ValidatedDocument};

/// One rule a document breaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON Pointer of the offending node (empty for the root)
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl Violation {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A document failed validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("OpenAPI validation failed ({version}):\n{}", list_violations(.violations))]
pub struct ValidationError {
    /// Declared version of the rejected document
    pub version: String,
    /// Every violation found
    pub violations: Vec<Violation>,
}

fn list_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validation switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Check against the embedded meta-schema
    pub meta_schema: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { meta_schema: true }
    }
}

/// Validate a bundled document
pub fn validate(
    document: BundledDocument,
    options: &ValidationOptions,
) -> Result<ValidatedDocument, ValidationError> {
    let (version, tree) = document.into_parts();
    let mut violations = Vec::new();

    structure::check(&version, &tree, &mut violations);
    if options.meta_schema {
        meta_schema::check(&version, &tree, &mut violations);
    }
    references::check(&version, &tree, &mut violations);

    if violations.is_empty() {
        debug!("{} document passed validation", version);
        Ok(ValidatedDocument::new(version, tree))
    } else {
        warn!(
            "{} document failed validation with {} violation(s)",
            version,
            violations.len()
        );
        Err(ValidationError {
            version: version.to_string(),
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpecVersion;
    use serde_json::json;

    #[test]
    fn test_error_lists_every_violation() {
        let err = ValidationError {
            version: "OpenAPI 3.0.0".to_string(),
            violations: vec![
                Violation::new("/info/title", "required field is missing"),
                Violation::new("", "document root must be an object"),
            ],
        };
        let message = err.to_string();
        assert!(message.starts_with("OpenAPI validation failed (OpenAPI 3.0.0):"));
        assert!(message.contains("  - /info/title: required field is missing"));
        assert!(message.contains("  - (root): document root must be an object"));
    }

    #[test]
    fn test_validate_minimal_document() {
        let doc = BundledDocument::new(
            SpecVersion::OpenApi3("3.0.3".to_string()),
            json!({
                "openapi": "3.0.3",
                "info": {"title": "Minimal", "version": "1.0.0"},
                "paths": {}
            }),
            0,
        );
        let validated = validate(doc, &ValidationOptions::default()).unwrap();
        assert_eq!(validated.title(), Some("Minimal"));
    }
}
