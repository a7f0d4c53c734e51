//! OpenAPI document structures
//!
//! A document moves through three stages, each represented by its own type so
//! that later stages can only be reached through the earlier ones:
//!
//! ```text
//! ParsedDocument --bundle--> BundledDocument --validate--> ValidatedDocument
//! ```
//!
//! The tree itself stays a generic `serde_json::Value`; only the version
//! discriminator is lifted into the type.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// HTTP methods that may appear as operations under a path item.
///
/// Any other key on a path item (`parameters`, `summary`, `servers`, ...) is
/// not an operation.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Check whether a path-item key names an HTTP operation
pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// Serialization format the raw text was detected as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Yaml => write!(f, "yaml"),
            SourceFormat::Json => write!(f, "json"),
        }
    }
}

/// Declared specification version of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "version", rename_all = "camelCase")]
pub enum SpecVersion {
    /// `swagger: "2.x"`
    Swagger2(String),
    /// `openapi: "3.x"`
    OpenApi3(String),
}

/// Why a tree could not be classified as a v2 or v3 document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionProblem {
    /// The root is not a mapping
    NotAnObject,
    /// Neither `swagger` nor `openapi` is present
    Missing,
    /// Both `swagger` and `openapi` are present
    Mixed,
    /// A discriminator is present but its value is not a supported version
    Unsupported(String),
}

impl fmt::Display for VersionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionProblem::NotAnObject => write!(f, "document root is not an object"),
            VersionProblem::Missing => {
                write!(f, "neither a 'swagger' nor an 'openapi' version field is present")
            }
            VersionProblem::Mixed => write!(
                f,
                "both 'swagger' and 'openapi' version fields are present; a document must declare exactly one"
            ),
            VersionProblem::Unsupported(found) => {
                write!(f, "unsupported specification version: {}", found)
            }
        }
    }
}

impl SpecVersion {
    /// Detect the version discriminator on a document root
    pub fn detect(root: &JsonValue) -> Result<Self, VersionProblem> {
        let obj = root.as_object().ok_or(VersionProblem::NotAnObject)?;

        match (obj.get("swagger"), obj.get("openapi")) {
            (Some(_), Some(_)) => Err(VersionProblem::Mixed),
            (None, None) => Err(VersionProblem::Missing),
            (Some(v), None) => match v.as_str() {
                Some(s) if s.starts_with("2.") => Ok(SpecVersion::Swagger2(s.to_string())),
                _ => Err(VersionProblem::Unsupported(format!("swagger: {}", v))),
            },
            (None, Some(v)) => match v.as_str() {
                Some(s) if s.starts_with("3.") => Ok(SpecVersion::OpenApi3(s.to_string())),
                _ => Err(VersionProblem::Unsupported(format!("openapi: {}", v))),
            },
        }
    }

    /// The `$ref` prefix that addresses a named schema in this version
    pub fn ref_prefix(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2(_) => "#/definitions/",
            SpecVersion::OpenApi3(_) => "#/components/schemas/",
        }
    }

    /// The schema-prefix belonging to the *other* version
    pub fn foreign_ref_prefix(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2(_) => "#/components/schemas/",
            SpecVersion::OpenApi3(_) => "#/definitions/",
        }
    }

    /// JSON Pointer of the schema container
    pub fn schema_container(&self) -> &'static str {
        match self {
            SpecVersion::Swagger2(_) => "/definitions",
            SpecVersion::OpenApi3(_) => "/components/schemas",
        }
    }

    /// Version string as declared (e.g. `3.0.3`)
    pub fn declared(&self) -> &str {
        match self {
            SpecVersion::Swagger2(v) | SpecVersion::OpenApi3(v) => v,
        }
    }

    /// Whether this is an OpenAPI 3.1+ document (where `paths` is optional)
    pub fn is_openapi_31_or_later(&self) -> bool {
        match self {
            SpecVersion::OpenApi3(v) => !v.starts_with("3.0"),
            SpecVersion::Swagger2(_) => false,
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::Swagger2(v) => write!(f, "Swagger {}", v),
            SpecVersion::OpenApi3(v) => write!(f, "OpenAPI {}", v),
        }
    }
}

/// A document fresh out of the format parser.
///
/// May still contain external `$ref`s.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    version: SpecVersion,
    format: SourceFormat,
    tree: JsonValue,
}

impl ParsedDocument {
    pub(crate) fn new(version: SpecVersion, format: SourceFormat, tree: JsonValue) -> Self {
        Self {
            version,
            format,
            tree,
        }
    }

    /// Declared version
    pub fn version(&self) -> &SpecVersion {
        &self.version
    }

    /// Format the raw text was detected as
    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// The document tree
    pub fn tree(&self) -> &JsonValue {
        &self.tree
    }

    /// Consume into the document tree
    pub fn into_tree(self) -> JsonValue {
        self.tree
    }
}

/// A document with every external `$ref` inlined.
///
/// Internal refs (`#/...`) are kept as references.
#[derive(Debug, Clone, PartialEq)]
pub struct BundledDocument {
    version: SpecVersion,
    tree: JsonValue,
    external_documents: usize,
}

impl BundledDocument {
    pub(crate) fn new(version: SpecVersion, tree: JsonValue, external_documents: usize) -> Self {
        Self {
            version,
            tree,
            external_documents,
        }
    }

    /// Declared version
    pub fn version(&self) -> &SpecVersion {
        &self.version
    }

    /// The bundled tree
    pub fn tree(&self) -> &JsonValue {
        &self.tree
    }

    /// Number of distinct external documents that were fetched and inlined
    pub fn external_documents(&self) -> usize {
        self.external_documents
    }

    pub(crate) fn into_parts(self) -> (SpecVersion, JsonValue) {
        (self.version, self.tree)
    }
}

/// A bundled document that conforms to the OpenAPI meta-schema of its version
/// and whose internal refs all resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDocument {
    version: SpecVersion,
    tree: JsonValue,
}

impl ValidatedDocument {
    pub(crate) fn new(version: SpecVersion, tree: JsonValue) -> Self {
        Self { version, tree }
    }

    /// Rebuild a document from previously persisted content.
    ///
    /// Stored content was validated when it was imported, so it is not
    /// validated again; only the version discriminator is re-detected.
    pub fn from_stored(tree: JsonValue) -> Result<Self, VersionProblem> {
        let version = SpecVersion::detect(&tree)?;
        Ok(Self { version, tree })
    }

    /// Declared version
    pub fn version(&self) -> &SpecVersion {
        &self.version
    }

    /// The validated tree
    pub fn tree(&self) -> &JsonValue {
        &self.tree
    }

    /// Consume into the document tree
    pub fn into_tree(self) -> JsonValue {
        self.tree
    }

    /// `info.title`, if present
    pub fn title(&self) -> Option<&str> {
        self.tree.pointer("/info/title").and_then(|v| v.as_str())
    }

    /// `info.version`, if present
    pub fn api_version(&self) -> Option<&str> {
        self.tree.pointer("/info/version").and_then(|v| v.as_str())
    }

    /// Named schemas in the version's schema container, in document order
    pub fn schema_names(&self) -> Vec<&str> {
        self.tree
            .pointer(self.version.schema_container())
            .and_then(|v| v.as_object())
            .map(|schemas| schemas.keys().map(|k| k.as_str()).collect())
            .unwrap_or_default()
    }
}
