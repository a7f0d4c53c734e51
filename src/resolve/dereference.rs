//! Full dereferencing
//!
//! Replaces every internal `$ref` with a copy of its target. Recursive
//! schemas cannot be expanded into a finite tree, so a ref that points back
//! into a target that is still being expanded fails with
//! [`ReferenceError::Cyclic`].

use serde_json::Value as JsonValue;
use std::collections::HashMap;

use super::reference::{decode_fragment, is_internal, ref_of, split_ref};
use super::{ReferenceError, ReferenceResult};

/// Produce a fully dereferenced copy of a bundled document tree.
///
/// External refs must already have been inlined; any left over are broken.
pub fn dereference(root: &JsonValue) -> ReferenceResult<JsonValue> {
    let mut expander = Expander {
        root,
        in_progress: Vec::new(),
        expanded: HashMap::new(),
    };
    expander.expand(root)
}

struct Expander<'a> {
    root: &'a JsonValue,
    /// Pointers currently being expanded, outermost first
    in_progress: Vec<String>,
    /// Fully expanded targets by pointer
    expanded: HashMap<String, JsonValue>,
}

impl Expander<'_> {
    fn expand(&mut self, node: &JsonValue) -> ReferenceResult<JsonValue> {
        if let Some(reference) = ref_of(node) {
            return self.expand_ref(reference);
        }

        Ok(match node {
            JsonValue::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.expand(value)?);
                }
                JsonValue::Object(out)
            }
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.expand(item))
                    .collect::<ReferenceResult<Vec<_>>>()?,
            ),
            other => other.clone(),
        })
    }

    fn expand_ref(&mut self, reference: &str) -> ReferenceResult<JsonValue> {
        let broken = |reason: String| ReferenceError::Broken {
            reference: reference.to_string(),
            document: "bundled document".to_string(),
            reason,
        };

        if !is_internal(reference) {
            return Err(broken("external reference was not bundled".to_string()));
        }
        let (_, fragment) = split_ref(reference);
        let pointer = decode_fragment(fragment).map_err(broken)?;

        if let Some(done) = self.expanded.get(&pointer) {
            return Ok(done.clone());
        }
        if let Some(position) = self.in_progress.iter().position(|p| *p == pointer) {
            let mut chain: Vec<String> = self.in_progress[position..]
                .iter()
                .map(|p| format!("#{}", p))
                .collect();
            chain.push(format!("#{}", pointer));
            return Err(ReferenceError::Cyclic { chain });
        }

        let root = self.root;
        let target = root
            .pointer(&pointer)
            .ok_or_else(|| broken(format!("target '{}' does not exist", pointer)))?;

        self.in_progress.push(pointer.clone());
        let result = self.expand(target);
        self.in_progress.pop();

        let value = result?;
        self.expanded.insert(pointer, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replaces_internal_refs() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {"schemas": {
                "Pet": {"type": "object"},
                "Pets": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}
            }}
        });
        let tree = dereference(&doc).unwrap();
        assert_eq!(
            tree["components"]["schemas"]["Pets"]["items"],
            json!({"type": "object"})
        );
    }

    #[test]
    fn test_chained_refs() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {"schemas": {
                "A": {"$ref": "#/components/schemas/B"},
                "B": {"$ref": "#/components/schemas/C"},
                "C": {"type": "string"}
            }}
        });
        let tree = dereference(&doc).unwrap();
        assert_eq!(tree["components"]["schemas"]["A"], json!({"type": "string"}));
    }

    #[test]
    fn test_recursive_schema_is_cyclic() {
        let doc = json!({
            "openapi": "3.0.0",
            "components": {"schemas": {
                "Node": {"type": "object", "properties": {
                    "next": {"$ref": "#/components/schemas/Node"}
                }}
            }}
        });
        let err = dereference(&doc).unwrap_err();
        match err {
            ReferenceError::Cyclic { chain } => {
                assert_eq!(chain, vec![
                    "#/components/schemas/Node".to_string(),
                    "#/components/schemas/Node".to_string()
                ]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_broken_ref() {
        let doc = json!({
            "openapi": "3.0.0",
            "paths": {"/a": {"$ref": "#/components/pathItems/Missing"}}
        });
        assert!(matches!(
            dereference(&doc),
            Err(ReferenceError::Broken { .. })
        ));
    }
}
