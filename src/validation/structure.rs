//! Structural rules
//!
//! These always run, with or without the meta-schema, and report exact
//! locations.

use serde_json::{Map, Value as JsonValue};

use super::Violation;
use crate::models::{SpecVersion, is_http_method};
use crate::resolve::reference::pointer_from_tokens;

const MISSING: &str = "required field is missing";

/// Append every structural violation in `tree` to `out`
pub fn check(version: &SpecVersion, tree: &JsonValue, out: &mut Vec<Violation>) {
    let Some(root) = tree.as_object() else {
        out.push(Violation::new("", "document root must be an object"));
        return;
    };

    if let Err(problem) = SpecVersion::detect(tree) {
        out.push(Violation::new("", problem.to_string()));
    }

    check_info(root, out);
    check_paths(version, root, out);
    check_containers(version, root, out);
}

fn check_info(root: &Map<String, JsonValue>, out: &mut Vec<Violation>) {
    let info = match root.get("info") {
        None => {
            out.push(Violation::new("/info", MISSING));
            return;
        }
        Some(JsonValue::Object(info)) => info,
        Some(_) => {
            out.push(Violation::new("/info", "must be an object"));
            return;
        }
    };

    for field in ["title", "version"] {
        match info.get(field) {
            None => out.push(Violation::new(format!("/info/{}", field), MISSING)),
            Some(JsonValue::String(_)) => {}
            Some(_) => out.push(Violation::new(format!("/info/{}", field), "must be a string")),
        }
    }
}

fn check_paths(version: &SpecVersion, root: &Map<String, JsonValue>, out: &mut Vec<Violation>) {
    let paths = match root.get("paths") {
        None => {
            if !version.is_openapi_31_or_later() {
                out.push(Violation::new("/paths", MISSING));
            }
            return;
        }
        Some(JsonValue::Object(paths)) => paths,
        Some(_) => {
            out.push(Violation::new("/paths", "must be an object"));
            return;
        }
    };

    let responses_required = !version.is_openapi_31_or_later();

    for (template, item) in paths {
        if template.starts_with("x-") {
            continue;
        }
        let item_path = pointer_from_tokens(&["paths", template.as_str()]);
        if !template.starts_with('/') {
            out.push(Violation::new(&item_path, "path must begin with '/'"));
        }
        let Some(item) = item.as_object() else {
            out.push(Violation::new(&item_path, "path item must be an object"));
            continue;
        };

        for (method, operation) in item.iter().filter(|(key, _)| is_http_method(key)) {
            let op_path = pointer_from_tokens(&["paths", template.as_str(), method.as_str()]);
            let Some(operation) = operation.as_object() else {
                out.push(Violation::new(&op_path, "operation must be an object"));
                continue;
            };
            match operation.get("responses") {
                None if responses_required => {
                    out.push(Violation::new(format!("{}/responses", op_path), MISSING));
                }
                Some(responses) if !responses.is_object() => {
                    out.push(Violation::new(
                        format!("{}/responses", op_path),
                        "must be an object",
                    ));
                }
                _ => {}
            }
        }
    }
}

fn check_containers(
    version: &SpecVersion,
    root: &Map<String, JsonValue>,
    out: &mut Vec<Violation>,
) {
    let (foreign, owner) = match version {
        SpecVersion::Swagger2(_) => ("components", "OpenAPI 3"),
        SpecVersion::OpenApi3(_) => ("definitions", "Swagger 2.0"),
    };
    if root.contains_key(foreign) {
        out.push(Violation::new(
            format!("/{}", foreign),
            format!(
                "'{}' is a {} container and is not allowed in a {} document",
                foreign, owner, version
            ),
        ));
    }

    if let SpecVersion::OpenApi3(_) = version
        && let Some(components) = root.get("components")
        && !components.is_object()
    {
        out.push(Violation::new("/components", "must be an object"));
        return;
    }

    let container = version.schema_container();
    if let Some(schemas) = root_pointer(root, container)
        && !schemas.is_object()
    {
        out.push(Violation::new(container, "must be an object"));
    }
}

fn root_pointer<'a>(root: &'a Map<String, JsonValue>, pointer: &str) -> Option<&'a JsonValue> {
    let mut tokens = pointer.trim_start_matches('/').split('/');
    let first = root.get(tokens.next()?)?;
    tokens.try_fold(first, |node, token| node.get(token))
}
