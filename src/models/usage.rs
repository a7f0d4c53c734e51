//! Schema usage structures
//!
//! Output shape of the dependency graph view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of an operation references a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageKind {
    /// Request body (v3 `requestBody`, v2 `in: body` parameter)
    RequestBody,
    /// Response body
    Response,
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageKind::RequestBody => write!(f, "requestBody"),
            UsageKind::Response => write!(f, "response"),
        }
    }
}

/// An operation that references a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationUsage {
    /// Path template (e.g. `/pets/{id}`)
    pub path: String,
    /// Lowercase HTTP method
    pub method: String,
    /// Where in the operation the schema is used
    #[serde(rename = "type")]
    pub kind: UsageKind,
}

/// Usage of one named schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaUsage {
    /// Operations referencing the schema, in path then method order
    pub operations: Vec<OperationUsage>,
    /// Other schemas whose definition references this schema
    pub referenced_by_schemas: Vec<String>,
}

impl SchemaUsage {
    /// A schema nothing references ("defined but not used")
    pub fn is_unused(&self) -> bool {
        self.operations.is_empty() && self.referenced_by_schemas.is_empty()
    }

    pub(crate) fn add_operation(&mut self, usage: OperationUsage) {
        if !self.operations.contains(&usage) {
            self.operations.push(usage);
        }
    }

    pub(crate) fn add_referencing_schema(&mut self, name: &str) {
        if !self.referenced_by_schemas.iter().any(|n| n == name) {
            self.referenced_by_schemas.push(name.to_string());
        }
    }
}
