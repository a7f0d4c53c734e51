//! Import functionality
//!
//! Turns raw input (a URL or uploaded file bytes) into a validated, bundled
//! document ready to be persisted:
//! - [`format`]: YAML/JSON detection and parsing
//! - [`source`]: input kinds and retrieval origins
//! - [`pipeline`]: fetch → parse → bundle → validate → serialize

pub mod format;
pub mod pipeline;
pub mod source;

pub use format::{FormatError, FormatHint, decode_text, parse_document, parse_fragment};
pub use pipeline::{ImportOptions, SpecImporter};
pub use source::{Origin, RawSpecInput, normalize_path};

use crate::dependency::DependencyError;
use crate::fetch::FetchError;
use crate::models::{NewSpec, SourceFormat, ValidatedDocument, VersionProblem};
use crate::resolve::ReferenceError;
use crate::storage::StorageError;
use crate::validation::ValidationError;
use crate::validation::input::{InputError, MAX_SPEC_NAME_LENGTH, validate_spec_name};

/// Name used when neither a name nor `info.title` is available
pub const DEFAULT_SPEC_NAME: &str = "openapi_spec";

/// Error during import.
///
/// The pipeline is fail-fast: the first failing stage ends the import and
/// nothing is persisted.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Parse error: {0}")]
    Parse(#[from] FormatError),
    #[error("Broken reference: {0}")]
    Reference(#[from] ReferenceError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),
    #[error("Could not persist spec: {0}")]
    Storage(#[from] StorageError),
    #[error("Unsupported specification format: {0}")]
    UnsupportedVersion(VersionProblem),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<DependencyError> for IngestError {
    fn from(error: DependencyError) -> Self {
        match error {
            DependencyError::UnsupportedFormat(problem) => IngestError::UnsupportedVersion(problem),
        }
    }
}

/// Result type for import operations
pub type IngestResult<T> = Result<T, IngestError>;

/// Result of a successful import.
///
/// Nothing has been persisted yet; see [`ImportedSpec::into_new_spec`].
#[derive(Debug, Clone)]
#[must_use = "import results should be persisted or inspected"]
pub struct ImportedSpec {
    /// The bundled, validated document
    pub document: ValidatedDocument,
    /// Format the primary document was written in
    pub source_format: SourceFormat,
    /// Where the primary document came from
    pub origin: Origin,
    /// Canonical YAML text of the bundled document
    pub raw_content: String,
    /// JSON text of the bundled document
    pub content: String,
    /// Number of external documents inlined while bundling
    pub external_documents: usize,
}

impl ImportedSpec {
    /// Display name: `name` when given, else [`ImportedSpec::default_name`].
    ///
    /// A supplied name is checked against the name limits.
    pub fn display_name(&self, name: Option<&str>) -> IngestResult<String> {
        match name {
            Some(name) => {
                validate_spec_name(name)?;
                Ok(name.trim().to_string())
            }
            None => Ok(self.default_name()),
        }
    }

    /// `info.title` (truncated to the name limit), else a fallback
    pub fn default_name(&self) -> String {
        let title = self
            .document
            .title()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SPEC_NAME);
        title.chars().take(MAX_SPEC_NAME_LENGTH).collect()
    }

    /// Convert into a record ready to be saved
    pub fn into_new_spec(self, name: Option<&str>) -> IngestResult<NewSpec> {
        Ok(NewSpec {
            name: self.display_name(name)?,
            content: self.content,
            raw_content: self.raw_content,
        })
    }
}
