//! Reference closure
//!
//! After bundling, every `$ref` must be internal and must resolve. A ref into
//! the other version's schema container is reported even when it happens to
//! resolve.

use serde_json::Value as JsonValue;

use super::Violation;
use crate::models::SpecVersion;
use crate::resolve::reference::{collect_refs, is_internal, resolve_internal};

/// Append every unresolved or misplaced `$ref` in `tree` to `out`
pub fn check(version: &SpecVersion, tree: &JsonValue, out: &mut Vec<Violation>) {
    for (location, reference) in collect_refs(tree) {
        let at = format!("{}/$ref", location);

        if !is_internal(&reference) {
            out.push(Violation::new(
                at,
                format!("external reference '{}' was not bundled", reference),
            ));
            continue;
        }

        if reference.starts_with(version.foreign_ref_prefix()) {
            out.push(Violation::new(
                at,
                format!(
                    "'{}' does not address a schema in a {} document (expected prefix '{}')",
                    reference,
                    version,
                    version.ref_prefix()
                ),
            ));
            continue;
        }

        if let Err(reason) = resolve_internal(tree, &reference) {
            out.push(Violation::new(
                at,
                format!("unresolved reference '{}': {}", reference, reason),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(tree: JsonValue) -> Vec<Violation> {
        let version = SpecVersion::detect(&tree).unwrap();
        let mut out = Vec::new();
        check(&version, &tree, &mut out);
        out
    }

    #[test]
    fn test_resolving_refs_pass() {
        let found = violations(json!({
            "openapi": "3.0.0",
            "components": {"schemas": {
                "Pet": {"type": "object"},
                "Pets": {"items": {"$ref": "#/components/schemas/Pet"}}
            }}
        }));
        assert!(found.is_empty());
    }

    #[test]
    fn test_unresolved_ref() {
        let found = violations(json!({
            "openapi": "3.0.0",
            "components": {"schemas": {"Pets": {"items": {"$ref": "#/components/schemas/Pet"}}}}
        }));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "/components/schemas/Pets/items/$ref");
        assert!(found[0].message.starts_with("unresolved reference"));
    }

    #[test]
    fn test_foreign_prefix_is_rejected() {
        let found = violations(json!({
            "swagger": "2.0",
            "definitions": {"Pet": {"$ref": "#/components/schemas/Other"}}
        }));
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("#/definitions/"));
    }

    #[test]
    fn test_external_ref_left_over() {
        let found = violations(json!({
            "openapi": "3.1.0",
            "components": {"schemas": {"Pet": {"$ref": "pet.yaml"}}}
        }));
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("not bundled"));
    }
}
