//! Persisted spec records
//!
//! A record is created once per successful import. Re-importing the same
//! document creates a new record; records are never updated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::document::ValidatedDocument;

/// A spec ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpec {
    /// Display name
    pub name: String,
    /// JSON serialization of the bundled document
    pub content: String,
    /// Canonical YAML serialization of the bundled document
    pub raw_content: String,
}

/// A persisted spec record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredSpec {
    /// Unique identifier
    pub id: Uuid,
    /// Display name (from `info.title` or provided at import)
    pub name: String,
    /// JSON string of the bundled document
    pub content: String,
    /// Canonical YAML text of the bundled document
    pub raw_content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredSpec {
    /// Create a record from a new spec, assigning id and timestamps
    pub fn create(spec: NewSpec) -> Self {
        let now = Utc::now();
        StoredSpec {
            id: Uuid::new_v4(),
            name: spec.name,
            content: spec.content,
            raw_content: spec.raw_content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse `content` back into a document tree.
    ///
    /// The content is not re-validated.
    pub fn document_tree(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::from_str(&self.content)
    }

    /// Parse `content` back into a [`ValidatedDocument`].
    ///
    /// Returns `None` when the stored tree carries no recognizable version
    /// discriminator.
    pub fn document(&self) -> Result<Option<ValidatedDocument>, serde_json::Error> {
        let tree = self.document_tree()?;
        Ok(ValidatedDocument::from_stored(tree).ok())
    }

    /// Summary without the (potentially large) content fields
    pub fn summary(&self) -> SpecSummary {
        SpecSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Record listing entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummary {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
