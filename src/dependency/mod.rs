//! Schema dependency graph
//!
//! For every named schema in a document, records the operations that use it
//! and the other schemas that reference it. Every schema in the container
//! gets an entry, so unused schemas show up with empty usage instead of
//! disappearing.
//!
//! The usage map is mirrored into a `petgraph` graph (edge `A -> B` when
//! schema `A` references schema `B`) for cycle and reachability queries.

mod builder;

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, Reversed};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::debug;

use crate::import::{IngestError, IngestResult};
use crate::models::{SchemaUsage, SpecVersion, StoredSpec, ValidatedDocument, VersionProblem};

/// Error building a dependency graph
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DependencyError {
    /// The tree is neither a Swagger 2.0 nor an OpenAPI 3.x document
    #[error("Unsupported specification format: {0}")]
    UnsupportedFormat(VersionProblem),
}

/// Schema usage for one document
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    version: SpecVersion,
    usage: IndexMap<String, SchemaUsage>,
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph for a validated document
    pub fn build(document: &ValidatedDocument) -> Self {
        Self::from_parts(document.version().clone(), document.tree())
    }

    /// Build the graph for an arbitrary tree, detecting its version first
    pub fn from_tree(tree: &JsonValue) -> Result<Self, DependencyError> {
        let version = SpecVersion::detect(tree).map_err(DependencyError::UnsupportedFormat)?;
        Ok(Self::from_parts(version, tree))
    }

    /// Build the graph for a stored record, without re-validating it
    pub fn from_stored(record: &StoredSpec) -> IngestResult<Self> {
        let tree = record
            .document_tree()
            .map_err(|e| IngestError::Serialization(format!("stored spec {}: {}", record.id, e)))?;
        Ok(Self::from_tree(&tree)?)
    }

    fn from_parts(version: SpecVersion, tree: &JsonValue) -> Self {
        let builder::UsageScan {
            usage,
            self_referencing,
        } = builder::build_usage(&version, tree);

        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for name in usage.keys() {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }
        for (target, entry) in &usage {
            for source in &entry.referenced_by_schemas {
                if let (Some(from), Some(to)) = (nodes.get(source), nodes.get(target)) {
                    graph.update_edge(*from, *to, ());
                }
            }
        }
        for name in &self_referencing {
            if let Some(node) = nodes.get(name) {
                graph.update_edge(*node, *node, ());
            }
        }

        debug!(
            "Built dependency graph for {} with {} schema(s)",
            version,
            usage.len()
        );

        Self {
            version,
            usage,
            graph,
            nodes,
        }
    }

    /// Version of the document the graph was built from
    pub fn version(&self) -> &SpecVersion {
        &self.version
    }

    /// Usage of every schema, in schema-container order
    pub fn usage(&self) -> &IndexMap<String, SchemaUsage> {
        &self.usage
    }

    /// Usage of one schema
    pub fn get(&self, name: &str) -> Option<&SchemaUsage> {
        self.usage.get(name)
    }

    /// Consume into the usage map
    pub fn into_usage(self) -> IndexMap<String, SchemaUsage> {
        self.usage
    }

    /// Schemas nothing references, in container order
    pub fn unused_schemas(&self) -> Vec<&str> {
        self.usage
            .iter()
            .filter(|(_, usage)| usage.is_unused())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Groups of schemas that reference each other, directly or
    /// transitively. A schema that references itself forms a group of one.
    pub fn recursive_groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|node| self.graph.contains_edge(*node, *node))
            })
            .map(|component| {
                let mut names: Vec<String> =
                    component.iter().map(|n| self.graph[*n].clone()).collect();
                names.sort_by_key(|name| self.usage.get_index_of(name));
                names
            })
            .collect();
        groups.sort_by_key(|group| group.first().and_then(|name| self.usage.get_index_of(name)));
        groups
    }

    /// Every schema that references `name`, directly or transitively, in
    /// container order. `name` itself is included only when it is recursive.
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let Some(start) = self.nodes.get(name).copied() else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut found = Vec::new();
        while let Some(node) = dfs.next(reversed) {
            if node != start {
                found.push(node);
            }
        }

        let recursive = self.graph.contains_edge(start, start)
            || found.iter().any(|node| self.graph.contains_edge(start, *node));
        if recursive {
            found.push(start);
        }

        let mut names: Vec<&str> = found.iter().map(|n| self.graph[*n].as_str()).collect();
        names.sort_by_key(|name| self.usage.get_index_of(*name));
        names
    }
}
