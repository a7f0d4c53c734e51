//! Canonical serialization
//!
//! A document tree is written back out as YAML (the stored raw text) or JSON.
//! Key order follows the tree, so the same tree always produces the same
//! text, and parsing the output yields a tree equal to the input.

use serde_json::Value as JsonValue;

use super::{ExportError, ExportResult, OutputFormat};

/// Serializes document trees
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalSerializer;

impl CanonicalSerializer {
    /// Serialize to canonical YAML
    pub fn to_yaml(&self, tree: &JsonValue) -> Result<String, ExportError> {
        serde_yaml::to_string(tree).map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Serialize to compact JSON
    pub fn to_json(&self, tree: &JsonValue) -> Result<String, ExportError> {
        serde_json::to_string(tree).map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self, tree: &JsonValue) -> Result<String, ExportError> {
        serde_json::to_string_pretty(tree)
            .map_err(|e| ExportError::SerializationError(e.to_string()))
    }

    /// Serialize in the requested format
    pub fn export(&self, tree: &JsonValue, format: OutputFormat) -> Result<ExportResult, ExportError> {
        let content = match format {
            OutputFormat::Yaml => self.to_yaml(tree)?,
            OutputFormat::Json => self.to_json(tree)?,
            OutputFormat::JsonPretty => self.to_json_pretty(tree)?,
        };
        Ok(ExportResult {
            content,
            format: format.to_string(),
        })
    }
}
