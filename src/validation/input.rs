//! Input validation and sanitization utilities.
//!
//! These checks run on user-supplied values before any parsing happens:
//! document sizes, spec names and record identifiers.
//!
//! # Security
//!
//! Input validation prevents:
//! - Memory exhaustion via oversized documents
//! - Path traversal via names that end up in file paths

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum size for one OpenAPI document (5MB)
pub const MAX_OPENAPI_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Maximum length for spec names
pub const MAX_SPEC_NAME_LENGTH: usize = 255;

/// Errors that can occur during input validation.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
pub enum InputError {
    /// Input is empty when a value is required
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// Input exceeds maximum allowed length
    #[error("{field} exceeds maximum length (max: {max}, got: {actual})")]
    TooLong {
        field: &'static str,
        max: u64,
        actual: u64,
    },

    /// Input has invalid format
    #[error("{0}: {1}")]
    InvalidFormat(&'static str, String),
}

/// Result type for input validation.
pub type InputResult<T> = Result<T, InputError>;

/// Validate a record identifier.
///
/// # Examples
///
/// ```
/// use openapi_ingest::validation::input::validate_record_id;
///
/// assert!(validate_record_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_record_id("not-a-uuid").is_err());
/// ```
pub fn validate_record_id(id: &str) -> InputResult<Uuid> {
    Uuid::parse_str(id.trim())
        .map_err(|e| InputError::InvalidFormat("Spec id", format!("invalid UUID format: {}", e)))
}

/// Validate the size of a document against a limit.
pub fn validate_document_size(size: u64, max: u64) -> InputResult<()> {
    if size > max {
        return Err(InputError::TooLong {
            field: "OpenAPI document size",
            max,
            actual: size,
        });
    }
    Ok(())
}

/// Validate a spec name supplied at import time.
///
/// # Rules
///
/// - Must not be empty (after trimming)
/// - Must not exceed 255 characters
pub fn validate_spec_name(name: &str) -> InputResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty("Spec name"));
    }
    let length = trimmed.chars().count();
    if length > MAX_SPEC_NAME_LENGTH {
        return Err(InputError::TooLong {
            field: "Spec name",
            max: MAX_SPEC_NAME_LENGTH as u64,
            actual: length as u64,
        });
    }
    Ok(())
}

/// Sanitize a spec name for use as a filename.
///
/// Alphanumerics, hyphens, underscores and single dots are kept; runs of
/// anything else collapse into one underscore.
///
/// # Examples
///
/// ```
/// use openapi_ingest::validation::input::sanitize_spec_name;
///
/// assert_eq!(sanitize_spec_name("petstore-api"), "petstore-api");
/// assert_eq!(sanitize_spec_name("Pet Store / v2"), "Pet_Store_v2");
/// assert_eq!(sanitize_spec_name("../../etc"), "etc");
/// ```
pub fn sanitize_spec_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    let mut last_was_separator = true;

    for ch in name.chars() {
        match ch {
            ch if ch.is_alphanumeric() || ch == '-' || ch == '_' => {
                sanitized.push(ch);
                last_was_separator = false;
            }
            '.' if !last_was_separator => {
                sanitized.push('.');
                last_was_separator = true;
            }
            _ => {
                if !last_was_separator {
                    sanitized.push('_');
                }
                last_was_separator = true;
            }
        }

        if sanitized.len() >= MAX_SPEC_NAME_LENGTH {
            break;
        }
    }

    let sanitized = sanitized.trim_end_matches(['.', '_']);
    if sanitized.is_empty() {
        "openapi_spec".to_string()
    } else {
        sanitized.to_string()
    }
}
