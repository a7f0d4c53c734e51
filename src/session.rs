//! Session context
//!
//! A [`SpecSession`] holds the document a caller is currently working with.
//! Sessions are plain values created and owned by the caller, so several
//! documents can be worked on side by side without sharing state.

use uuid::Uuid;

use crate::dependency::DependencyGraph;
use crate::import::ImportedSpec;
use crate::models::{StoredSpec, ValidatedDocument, VersionProblem};

/// Error activating a document
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The stored content is not JSON
    #[error("Stored spec {id} has unreadable content: {message}")]
    Corrupt { id: Uuid, message: String },

    /// The stored content carries no usable version discriminator
    #[error("Stored spec {id} is not a supported OpenAPI document: {problem}")]
    Unsupported { id: Uuid, problem: VersionProblem },
}

/// The document a session is working with
#[derive(Debug, Clone)]
pub struct ActiveSpec {
    /// Stored record id; `None` when activated straight from an import
    pub id: Option<Uuid>,
    /// Display name
    pub name: String,
    /// The document
    pub document: ValidatedDocument,
}

/// Caller-owned "current document" context
#[derive(Debug, Default)]
pub struct SpecSession {
    active: Option<ActiveSpec>,
    graph: Option<DependencyGraph>,
}

impl SpecSession {
    /// Create a session with no active document
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a stored record the active document.
    ///
    /// The stored content is parsed but not re-validated.
    pub fn activate(&mut self, record: &StoredSpec) -> Result<&ActiveSpec, SessionError> {
        let tree = record.document_tree().map_err(|e| SessionError::Corrupt {
            id: record.id,
            message: e.to_string(),
        })?;
        let document =
            ValidatedDocument::from_stored(tree).map_err(|problem| SessionError::Unsupported {
                id: record.id,
                problem,
            })?;

        Ok(self.set(ActiveSpec {
            id: Some(record.id),
            name: record.name.clone(),
            document,
        }))
    }

    /// Make a freshly imported document the active document
    pub fn activate_imported(&mut self, imported: &ImportedSpec) -> &ActiveSpec {
        self.set(ActiveSpec {
            id: None,
            name: imported.default_name(),
            document: imported.document.clone(),
        })
    }

    /// Drop the active document
    pub fn clear(&mut self) {
        self.active = None;
        self.graph = None;
    }

    /// The active document, if any
    pub fn active(&self) -> Option<&ActiveSpec> {
        self.active.as_ref()
    }

    /// Dependency graph of the active document, built on first use
    pub fn dependency_graph(&mut self) -> Option<&DependencyGraph> {
        let active = self.active.as_ref()?;
        Some(
            self.graph
                .get_or_insert_with(|| DependencyGraph::build(&active.document)),
        )
    }

    fn set(&mut self, active: ActiveSpec) -> &ActiveSpec {
        self.graph = None;
        self.active.insert(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSpec;

    fn record(content: &str) -> StoredSpec {
        StoredSpec::create(NewSpec {
            name: "Petstore".to_string(),
            content: content.to_string(),
            raw_content: String::new(),
        })
    }

    const PETSTORE: &str = r##"{
        "swagger": "2.0",
        "info": {"title": "Petstore", "version": "1"},
        "paths": {},
        "definitions": {"Pet": {"type": "object"}, "Tag": {"type": "string"}}
    }"##;

    #[test]
    fn test_activate_and_graph() {
        let mut session = SpecSession::new();
        assert!(session.active().is_none());
        assert!(session.dependency_graph().is_none());

        let stored = record(PETSTORE);
        let active = session.activate(&stored).unwrap();
        assert_eq!(active.id, Some(stored.id));
        assert_eq!(active.name, "Petstore");

        let graph = session.dependency_graph().unwrap();
        assert_eq!(graph.unused_schemas(), vec!["Pet", "Tag"]);

        session.clear();
        assert!(session.active().is_none());
        assert!(session.dependency_graph().is_none());
    }

    #[test]
    fn test_activate_replaces_cached_graph() {
        let mut session = SpecSession::new();
        session.activate(&record(PETSTORE)).unwrap();
        assert_eq!(session.dependency_graph().unwrap().usage().len(), 2);

        let other = r#"{"openapi": "3.0.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#;
        session.activate(&record(other)).unwrap();
        assert!(session.dependency_graph().unwrap().usage().is_empty());
    }

    #[test]
    fn test_activate_rejects_bad_content() {
        let mut session = SpecSession::new();
        assert!(matches!(
            session.activate(&record("not json")),
            Err(SessionError::Corrupt { .. })
        ));
        assert!(matches!(
            session.activate(&record(r#"{"info": {}}"#)),
            Err(SessionError::Unsupported { .. })
        ));
        assert!(session.active().is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut first = SpecSession::new();
        let second = SpecSession::new();
        first.activate(&record(PETSTORE)).unwrap();
        assert!(first.active().is_some());
        assert!(second.active().is_none());
    }
}
