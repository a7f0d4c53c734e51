//! Models module
//!
//! Defines the document stages, persisted records and dependency-view output
//! shared across the crate.

pub mod document;
pub mod stored;
pub mod usage;

pub use document::{
    BundledDocument, HTTP_METHODS, ParsedDocument, SourceFormat, SpecVersion, ValidatedDocument,
    VersionProblem, is_http_method,
};
pub use stored::{NewSpec, SpecSummary, StoredSpec};
pub use usage::{OperationUsage, SchemaUsage, UsageKind};
