//! Bundling of external references
//!
//! Bundling runs in two phases. Discovery walks the reference graph
//! breadth-first, fetching every distinct external document exactly once and
//! recording document-to-document edges in a `petgraph` graph. A strongly
//! connected component spanning more than one document is a reference cycle
//! and fails the import. Inlining then replaces each external `$ref` with a
//! copy of its target. The first copy of a target is placed where it is first
//! met; every later ref to the same target (including recursive refs from
//! inside the copy) becomes an internal ref to that location.
//!
//! The root's schema containers are walked before `paths`, so shared schemas
//! land under `components`/`definitions` rather than inside an operation.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::{Value as JsonValue, json};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info};

use super::reference::{collect_refs, decode_fragment, pointer_from_tokens, ref_of, split_ref};
use super::{ReferenceError, ReferenceResult};
use crate::fetch::DocumentFetcher;
use crate::import::Origin;
use crate::import::format::parse_fragment;
use crate::models::{BundledDocument, ParsedDocument};

/// Root keys walked first during inlining, in this order
const PRIORITY_ROOT_KEYS: [&str; 4] = ["components", "definitions", "parameters", "responses"];

/// Inline every external `$ref` in `parsed`.
///
/// `origin` is where the root document came from; relative refs are resolved
/// against it. Refs naming the root document itself become internal refs;
/// plain internal refs are left untouched.
pub async fn bundle(
    parsed: ParsedDocument,
    origin: &Origin,
    fetcher: &dyn DocumentFetcher,
) -> ReferenceResult<BundledDocument> {
    let version = parsed.version().clone();
    let mut tree = parsed.into_tree();

    let documents = DocumentSet::discover(&tree, origin, fetcher).await?;
    documents.check_acyclic()?;

    let external_documents = documents.external.len();
    let mut inliner = Inliner {
        root: origin,
        documents: &documents.external,
        placed: HashMap::new(),
    };
    inliner.walk_root(&mut tree)?;
    if external_documents > 0 {
        info!(
            "Bundled {} external document(s) into {}",
            external_documents, origin
        );
    }

    Ok(BundledDocument::new(version, tree, external_documents))
}

/// Every document reachable from the root, with the edges between them
struct DocumentSet {
    external: HashMap<Origin, JsonValue>,
    graph: DiGraph<Origin, ()>,
}

impl DocumentSet {
    async fn discover(
        root_tree: &JsonValue,
        root: &Origin,
        fetcher: &dyn DocumentFetcher,
    ) -> ReferenceResult<Self> {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<Origin, NodeIndex> = HashMap::new();
        let mut external: HashMap<Origin, JsonValue> = HashMap::new();
        let mut queue = VecDeque::new();

        nodes.insert(root.clone(), graph.add_node(root.clone()));
        queue.push_back(root.clone());

        while let Some(current) = queue.pop_front() {
            let targets = {
                let tree = if current == *root {
                    root_tree
                } else {
                    match external.get(&current) {
                        Some(tree) => tree,
                        None => continue,
                    }
                };
                external_targets(tree, &current)?
            };

            for target in targets {
                let target_node = match nodes.get(&target) {
                    Some(node) => *node,
                    None => {
                        debug!("Fetching referenced document {}", target);
                        let text = fetcher.fetch(&target).await.map_err(|source| {
                            ReferenceError::Unreachable {
                                location: target.to_string(),
                                source,
                            }
                        })?;
                        let value = parse_fragment(&text, target.format_hint()).map_err(
                            |source| ReferenceError::Unparseable {
                                location: target.to_string(),
                                source,
                            },
                        )?;

                        external.insert(target.clone(), value);
                        let node = graph.add_node(target.clone());
                        nodes.insert(target.clone(), node);
                        queue.push_back(target);
                        node
                    }
                };

                if let Some(from) = nodes.get(&current).copied()
                    && from != target_node
                {
                    graph.update_edge(from, target_node, ());
                }
            }
        }

        Ok(Self { external, graph })
    }

    fn check_acyclic(&self) -> ReferenceResult<()> {
        for component in tarjan_scc(&self.graph) {
            if component.len() > 1 {
                return Err(ReferenceError::Cyclic {
                    chain: cycle_chain(&self.graph, &component),
                });
            }
        }
        Ok(())
    }
}

/// External documents referenced from `tree`, in first-seen order
fn external_targets(tree: &JsonValue, current: &Origin) -> ReferenceResult<Vec<Origin>> {
    let mut targets = Vec::new();
    for (_, reference) in collect_refs(tree) {
        let (document, _) = split_ref(&reference);
        if document.is_empty() {
            continue;
        }
        let target = current
            .join(document)
            .map_err(|reason| ReferenceError::Broken {
                reference: reference.clone(),
                document: current.to_string(),
                reason,
            })?;
        if target != *current && !targets.contains(&target) {
            targets.push(target);
        }
    }
    Ok(targets)
}

/// Walk one cycle through a strongly connected component, starting from its
/// earliest-discovered document
fn cycle_chain(graph: &DiGraph<Origin, ()>, component: &[NodeIndex]) -> Vec<String> {
    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let Some(start) = component.iter().min().copied() else {
        return Vec::new();
    };

    let mut parents: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        for next in graph.neighbors(node) {
            if !members.contains(&next) {
                continue;
            }
            if next == start {
                let mut path = vec![node];
                let mut cursor = node;
                while let Some(parent) = parents.get(&cursor) {
                    path.push(*parent);
                    cursor = *parent;
                }
                path.reverse();
                path.push(start);
                return path.iter().map(|n| graph[*n].to_string()).collect();
            }
            if !parents.contains_key(&next) {
                parents.insert(next, node);
                queue.push_back(next);
            }
        }
    }

    component.iter().map(|n| graph[*n].to_string()).collect()
}

struct Inliner<'a> {
    root: &'a Origin,
    documents: &'a HashMap<Origin, JsonValue>,
    /// `(document, pointer)` of each inlined target, mapped to where its copy
    /// now lives in the root
    placed: HashMap<(Origin, String), String>,
}

impl Inliner<'_> {
    fn walk_root(&mut self, tree: &mut JsonValue) -> ReferenceResult<()> {
        let Some(object) = tree.as_object_mut() else {
            return Ok(());
        };

        let mut keys: Vec<String> = PRIORITY_ROOT_KEYS
            .iter()
            .filter(|key| object.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        keys.extend(
            object
                .keys()
                .filter(|key| !PRIORITY_ROOT_KEYS.contains(&key.as_str()))
                .cloned(),
        );

        let root = self.root;
        let mut path = Vec::new();
        for key in keys {
            if let Some(child) = object.get_mut(&key) {
                path.push(key);
                self.walk(child, root, &mut path)?;
                path.pop();
            }
        }
        Ok(())
    }

    fn walk(
        &mut self,
        node: &mut JsonValue,
        current: &Origin,
        path: &mut Vec<String>,
    ) -> ReferenceResult<()> {
        if let Some(reference) = ref_of(node).map(str::to_string) {
            return self.replace_ref(node, &reference, current, path);
        }

        match node {
            JsonValue::Object(map) => {
                for (key, value) in map.iter_mut() {
                    path.push(key.clone());
                    self.walk(value, current, path)?;
                    path.pop();
                }
            }
            JsonValue::Array(items) => {
                for (index, value) in items.iter_mut().enumerate() {
                    path.push(index.to_string());
                    self.walk(value, current, path)?;
                    path.pop();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn replace_ref(
        &mut self,
        node: &mut JsonValue,
        reference: &str,
        current: &Origin,
        path: &mut Vec<String>,
    ) -> ReferenceResult<()> {
        let broken = |reason: String| ReferenceError::Broken {
            reference: reference.to_string(),
            document: current.to_string(),
            reason,
        };

        let (document, fragment) = split_ref(reference);
        let target_document = current.join(document).map_err(broken)?;

        if target_document == *self.root {
            if !document.is_empty() {
                *node = json!({ "$ref": format!("#{}", fragment) });
            }
            return Ok(());
        }

        let pointer = decode_fragment(fragment).map_err(broken)?;
        let here = pointer_from_tokens(path);
        let key = (target_document.clone(), pointer.clone());

        if let Some(existing) = self.placed.get(&key) {
            if *existing == here {
                return Err(broken("reference resolves to itself".to_string()));
            }
            *node = json!({ "$ref": format!("#{}", existing) });
            return Ok(());
        }

        let source = self
            .documents
            .get(&target_document)
            .ok_or_else(|| broken(format!("document {} was not retrieved", target_document)))?;
        let target = source
            .pointer(&pointer)
            .ok_or_else(|| broken(format!("target '{}' does not exist in {}", pointer, target_document)))?;

        debug!("Inlining {} at {}", reference, here);
        self.placed.insert(key, here);
        *node = target.clone();
        self.walk(node, &target_document, path)
    }
}
