//! Usage map construction
//!
//! Walks the schema container and every operation of a document, recording
//! which schemas reference each named schema and which operations use it.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::models::{OperationUsage, SchemaUsage, SpecVersion, UsageKind, is_http_method};
use crate::resolve::reference::{REF_KEY, ref_of, resolve_internal, unescape_token};

/// Usage map plus the schemas that reference themselves
#[derive(Debug, Default)]
pub(crate) struct UsageScan {
    pub usage: IndexMap<String, SchemaUsage>,
    /// A schema never lists itself in `referenced_by_schemas`; self refs are
    /// kept here for recursion detection
    pub self_referencing: Vec<String>,
}

/// Build the usage map for a document tree
pub(crate) fn build_usage(version: &SpecVersion, tree: &JsonValue) -> UsageScan {
    let prefix = version.ref_prefix();
    let mut usage: IndexMap<String, SchemaUsage> = IndexMap::new();
    let mut self_referencing = Vec::new();

    let schemas = tree
        .pointer(version.schema_container())
        .and_then(|v| v.as_object());

    if let Some(schemas) = schemas {
        for name in schemas.keys() {
            usage.insert(name.clone(), SchemaUsage::default());
        }

        for (name, body) in schemas {
            let mut referenced = Vec::new();
            collect_schema_refs(body, prefix, &mut referenced);
            for target in referenced {
                if target == *name {
                    if !self_referencing.contains(name) {
                        self_referencing.push(name.clone());
                    }
                } else if let Some(entry) = usage.get_mut(&target) {
                    entry.add_referencing_schema(name);
                }
            }
        }
    }

    let Some(paths) = tree.get("paths").and_then(|v| v.as_object()) else {
        return UsageScan {
            usage,
            self_referencing,
        };
    };

    for (path, item) in paths {
        let Some(item) = item.as_object() else {
            continue;
        };
        let shared_parameters = item.get("parameters");

        for (method, operation) in item.iter().filter(|(key, _)| is_http_method(key)) {
            let mut record = |nodes: Vec<&JsonValue>, kind: UsageKind| {
                let mut referenced = Vec::new();
                for node in nodes {
                    collect_schema_refs(node, prefix, &mut referenced);
                }
                for target in referenced {
                    if let Some(entry) = usage.get_mut(&target) {
                        entry.add_operation(OperationUsage {
                            path: path.clone(),
                            method: method.clone(),
                            kind,
                        });
                    }
                }
            };

            record(
                request_schemas(version, tree, operation, shared_parameters),
                UsageKind::RequestBody,
            );
            record(response_schemas(version, tree, operation), UsageKind::Response);
        }
    }

    UsageScan {
        usage,
        self_referencing,
    }
}

/// Request payload schemas: v3 `requestBody` content, v2 `in: body` parameters
fn request_schemas<'a>(
    version: &SpecVersion,
    root: &'a JsonValue,
    operation: &'a JsonValue,
    shared_parameters: Option<&'a JsonValue>,
) -> Vec<&'a JsonValue> {
    match version {
        SpecVersion::OpenApi3(_) => operation
            .get("requestBody")
            .map(|body| follow(root, body, "#/components/requestBodies/"))
            .map(content_schemas)
            .unwrap_or_default(),
        SpecVersion::Swagger2(_) => shared_parameters
            .into_iter()
            .chain(operation.get("parameters"))
            .filter_map(|list| list.as_array())
            .flatten()
            .map(|param| follow(root, param, "#/parameters/"))
            .filter(|param| param.get("in").and_then(|v| v.as_str()) == Some("body"))
            .filter_map(|param| param.get("schema"))
            .collect(),
    }
}

/// Response payload schemas: v3 response content, v2 response `schema`
fn response_schemas<'a>(
    version: &SpecVersion,
    root: &'a JsonValue,
    operation: &'a JsonValue,
) -> Vec<&'a JsonValue> {
    let Some(responses) = operation.get("responses").and_then(|v| v.as_object()) else {
        return Vec::new();
    };

    match version {
        SpecVersion::OpenApi3(_) => responses
            .values()
            .map(|response| follow(root, response, "#/components/responses/"))
            .flat_map(content_schemas)
            .collect(),
        SpecVersion::Swagger2(_) => responses
            .values()
            .map(|response| follow(root, response, "#/responses/"))
            .filter_map(|response| response.get("schema"))
            .collect(),
    }
}

/// `schema` of every media type under `content`
fn content_schemas(node: &JsonValue) -> Vec<&JsonValue> {
    node.get("content")
        .and_then(|v| v.as_object())
        .map(|content| {
            content
                .values()
                .filter_map(|media| media.get("schema"))
                .collect()
        })
        .unwrap_or_default()
}

/// Follow one reference to a reusable component under `prefix`; anything
/// else is returned unchanged
fn follow<'a>(root: &'a JsonValue, node: &'a JsonValue, prefix: &str) -> &'a JsonValue {
    match ref_of(node) {
        Some(reference) if reference.starts_with(prefix) => {
            resolve_internal(root, reference).unwrap_or(node)
        }
        _ => node,
    }
}

/// Collect the schema names of every `$ref` under `node` that starts with
/// `prefix`, deduplicated, in first-seen order
fn collect_schema_refs(node: &JsonValue, prefix: &str, out: &mut Vec<String>) {
    match node {
        JsonValue::Object(map) => {
            if let Some(name) = map
                .get(REF_KEY)
                .and_then(|v| v.as_str())
                .and_then(|reference| schema_name(reference, prefix))
                && !out.contains(&name)
            {
                out.push(name);
            }
            for value in map.values() {
                collect_schema_refs(value, prefix, out);
            }
        }
        JsonValue::Array(items) => {
            for value in items {
                collect_schema_refs(value, prefix, out);
            }
        }
        _ => {}
    }
}

/// Schema name addressed by a reference, if it starts with `prefix`.
///
/// `#/components/schemas/Pet/properties/id` addresses `Pet`.
fn schema_name(reference: &str, prefix: &str) -> Option<String> {
    let rest = reference.strip_prefix(prefix)?;
    let token = rest.split('/').next().filter(|t| !t.is_empty())?;
    let decoded = urlencoding::decode(token).ok()?;
    Some(unescape_token(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_name() {
        assert_eq!(
            schema_name("#/components/schemas/Pet", "#/components/schemas/"),
            Some("Pet".to_string())
        );
        assert_eq!(
            schema_name("#/components/schemas/Pet/properties/id", "#/components/schemas/"),
            Some("Pet".to_string())
        );
        assert_eq!(
            schema_name("#/definitions/a~1b%20c", "#/definitions/"),
            Some("a/b c".to_string())
        );
        assert_eq!(schema_name("#/definitions/Pet", "#/components/schemas/"), None);
        assert_eq!(schema_name("#/definitions/", "#/definitions/"), None);
    }

    #[test]
    fn test_collect_schema_refs_dedupes() {
        let node = json!({
            "allOf": [
                {"$ref": "#/definitions/A"},
                {"properties": {"x": {"$ref": "#/definitions/A"}, "y": {"$ref": "#/definitions/B"}}}
            ]
        });
        let mut out = Vec::new();
        collect_schema_refs(&node, "#/definitions/", &mut out);
        assert_eq!(out, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_follow_only_matching_prefix() {
        let root = json!({"components": {"requestBodies": {"PetBody": {"content": {}}}}});
        let node = json!({"$ref": "#/components/requestBodies/PetBody"});
        assert_eq!(
            follow(&root, &node, "#/components/requestBodies/"),
            &json!({"content": {}})
        );
        assert_eq!(follow(&root, &node, "#/components/responses/"), &node);
    }
}
