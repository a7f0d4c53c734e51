//! `$ref` string helpers
//!
//! A reference has a document part and an optional fragment:
//! `schemas/pet.yaml#/Pet` splits into `schemas/pet.yaml` and `/Pet`. The
//! fragment is a percent-encoded JSON Pointer.

use serde_json::Value as JsonValue;

/// Key under which a reference is stored
pub const REF_KEY: &str = "$ref";

/// Split a reference into its document part and its (still encoded) fragment
pub fn split_ref(reference: &str) -> (&str, &str) {
    match reference.split_once('#') {
        Some((document, fragment)) => (document, fragment),
        None => (reference, ""),
    }
}

/// Whether a reference addresses the document it appears in
pub fn is_internal(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Percent-decode a fragment into a JSON Pointer.
///
/// An empty fragment addresses the whole document.
pub fn decode_fragment(fragment: &str) -> Result<String, String> {
    let decoded = urlencoding::decode(fragment)
        .map_err(|e| format!("fragment '{}' is not valid percent-encoding: {}", fragment, e))?;
    if !decoded.is_empty() && !decoded.starts_with('/') {
        return Err(format!(
            "fragment '{}' is not a JSON Pointer (must start with '/')",
            fragment
        ));
    }
    Ok(decoded.into_owned())
}

/// Escape one token for use inside a JSON Pointer
pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescape one JSON Pointer token
pub fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Build a JSON Pointer from unescaped tokens
pub fn pointer_from_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| format!("/{}", escape_token(t.as_ref())))
        .collect()
}

/// Resolve an internal reference (`#/...`) against a document root
pub fn resolve_internal<'a>(root: &'a JsonValue, reference: &str) -> Result<&'a JsonValue, String> {
    let (document, fragment) = split_ref(reference);
    if !document.is_empty() {
        return Err(format!("'{}' is not an internal reference", reference));
    }
    let pointer = decode_fragment(fragment)?;
    root.pointer(&pointer)
        .ok_or_else(|| format!("target '{}' does not exist", pointer))
}

/// The `$ref` string of a node, if the node is a reference object
pub fn ref_of(node: &JsonValue) -> Option<&str> {
    node.as_object()
        .and_then(|obj| obj.get(REF_KEY))
        .and_then(|v| v.as_str())
}

/// Collect every `$ref` string in a tree, in document order, paired with the
/// JSON Pointer of the reference object
pub fn collect_refs(root: &JsonValue) -> Vec<(String, String)> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    walk_refs(root, &mut path, &mut found);
    found
}

fn walk_refs(node: &JsonValue, path: &mut Vec<String>, found: &mut Vec<(String, String)>) {
    match node {
        JsonValue::Object(map) => {
            if let Some(reference) = map.get(REF_KEY).and_then(|v| v.as_str()) {
                found.push((pointer_from_tokens(path), reference.to_string()));
            }
            for (key, value) in map {
                path.push(key.clone());
                walk_refs(value, path, found);
                path.pop();
            }
        }
        JsonValue::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                path.push(index.to_string());
                walk_refs(value, path, found);
                path.pop();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_ref() {
        assert_eq!(split_ref("#/components/schemas/Pet"), ("", "/components/schemas/Pet"));
        assert_eq!(split_ref("pet.yaml#/Pet"), ("pet.yaml", "/Pet"));
        assert_eq!(split_ref("pet.yaml"), ("pet.yaml", ""));
        assert!(is_internal("#/definitions/Pet"));
        assert!(!is_internal("pet.yaml#/Pet"));
    }

    #[test]
    fn test_decode_fragment() {
        assert_eq!(decode_fragment("/a%20b").unwrap(), "/a b");
        assert_eq!(decode_fragment("").unwrap(), "");
        assert!(decode_fragment("Pet").is_err());
    }

    #[test]
    fn test_pointer_tokens_escape() {
        assert_eq!(
            pointer_from_tokens(&["paths", "/pets/{id}", "get"]),
            "/paths/~1pets~1{id}/get"
        );
        assert_eq!(unescape_token("a~1b~0c"), "a/b~c");
        assert_eq!(escape_token("a/b~c"), "a~1b~0c");
    }

    #[test]
    fn test_resolve_internal() {
        let doc = json!({"components": {"schemas": {"Pet": {"type": "object"}}}});
        let target = resolve_internal(&doc, "#/components/schemas/Pet").unwrap();
        assert_eq!(target["type"], "object");
        assert!(resolve_internal(&doc, "#/components/schemas/Missing").is_err());
        assert!(resolve_internal(&doc, "other.yaml#/x").is_err());
        assert_eq!(resolve_internal(&doc, "#").unwrap(), &doc);
    }

    #[test]
    fn test_collect_refs_ignores_non_string_ref_properties() {
        let doc = json!({
            "a": {"$ref": "#/b"},
            "props": {"properties": {"$ref": {"type": "string"}}},
            "list": [{"$ref": "x.yaml"}]
        });
        let refs = collect_refs(&doc);
        assert_eq!(
            refs,
            vec![
                ("/a".to_string(), "#/b".to_string()),
                ("/list/0".to_string(), "x.yaml".to_string()),
            ]
        );
    }
}
