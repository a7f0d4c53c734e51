//! Format detection and parsing
//!
//! Raw text is tried as YAML first and JSON second (reversed when the caller
//! knows the content is JSON). A parse attempt only counts as successful when
//! it yields a mapping carrying a `swagger` or `openapi` discriminator.

use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;

use crate::models::{ParsedDocument, SourceFormat, SpecVersion, VersionProblem};

/// Format parse errors
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FormatError {
    /// Neither parser could read the text at all
    #[error("Content is not valid YAML or JSON (YAML error: {yaml}; JSON error: {json})")]
    Unparseable { yaml: String, json: String },
    /// At least one parser read the text, but not as an OpenAPI object
    #[error("Content is not a valid OpenAPI object (YAML: {yaml}; JSON: {json})")]
    NotOpenApi { yaml: String, json: String },
    /// Bytes were not valid UTF-8
    #[error("Content is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Which parser to try first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatHint {
    /// YAML first, JSON second
    #[default]
    Auto,
    /// Content is expected to be YAML
    Yaml,
    /// Content is expected to be JSON; JSON is tried first
    Json,
}

impl FormatHint {
    /// Hint from a filename extension: `.yaml`/`.yml` select YAML, anything
    /// else (including `.json`) selects JSON
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            FormatHint::Yaml
        } else {
            FormatHint::Json
        }
    }

    /// Hint from a URL path; no hint unless the extension is explicit
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
        if path.ends_with(".json") {
            FormatHint::Json
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            FormatHint::Yaml
        } else {
            FormatHint::Auto
        }
    }
}

enum Attempt {
    Parsed(SpecVersion, JsonValue),
    NotOpenApi(String),
    Syntax(String),
}

impl Attempt {
    fn describe(&self) -> String {
        match self {
            Attempt::Parsed(version, _) => format!("parsed as {}", version),
            Attempt::NotOpenApi(msg) | Attempt::Syntax(msg) => msg.clone(),
        }
    }
}

/// Decode uploaded bytes, dropping a leading byte-order mark
pub fn decode_text(bytes: &[u8]) -> Result<&str, FormatError> {
    let text = std::str::from_utf8(bytes).map_err(|e| FormatError::Encoding(e.to_string()))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Parse raw text into a [`ParsedDocument`]
pub fn parse_document(text: &str, hint: FormatHint) -> Result<ParsedDocument, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let json_first = hint == FormatHint::Json;
    let first = if json_first {
        attempt_json(text)
    } else {
        attempt_yaml(text)
    };

    if let Attempt::Parsed(version, tree) = first {
        let format = if json_first || is_strict_json(text) {
            SourceFormat::Json
        } else {
            SourceFormat::Yaml
        };
        return Ok(ParsedDocument::new(version, format, tree));
    }

    let second = if json_first {
        attempt_yaml(text)
    } else {
        attempt_json(text)
    };

    if let Attempt::Parsed(version, tree) = second {
        let format = if json_first {
            SourceFormat::Yaml
        } else {
            SourceFormat::Json
        };
        return Ok(ParsedDocument::new(version, format, tree));
    }

    let (yaml, json) = if json_first {
        (second, first)
    } else {
        (first, second)
    };
    let both_syntax = matches!(yaml, Attempt::Syntax(_)) && matches!(json, Attempt::Syntax(_));
    let (yaml, json) = (yaml.describe(), json.describe());

    if both_syntax {
        Err(FormatError::Unparseable { yaml, json })
    } else {
        Err(FormatError::NotOpenApi { yaml, json })
    }
}

/// Parse an external document fragment.
///
/// Unlike [`parse_document`], any syntactically valid YAML or JSON value is
/// accepted: referenced files usually hold a bare schema, not a full document.
pub fn parse_fragment(text: &str, hint: FormatHint) -> Result<JsonValue, FormatError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let yaml = || -> Result<JsonValue, String> {
        let value: YamlValue = serde_yaml::from_str(text).map_err(|e| e.to_string())?;
        yaml_to_json(value)
    };
    let json = || -> Result<JsonValue, String> {
        serde_json::from_str::<JsonValue>(text).map_err(|e| e.to_string())
    };

    let json_first = hint == FormatHint::Json;
    let first = if json_first { json() } else { yaml() };
    let first = match first {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    let second = if json_first { yaml() } else { json() };

    match second {
        Ok(value) => Ok(value),
        Err(second) => {
            let (yaml, json) = if json_first {
                (second, first)
            } else {
                (first, second)
            };
            Err(FormatError::Unparseable { yaml, json })
        }
    }
}

fn attempt_yaml(text: &str) -> Attempt {
    let value: YamlValue = match serde_yaml::from_str(text) {
        Ok(v) => v,
        Err(e) => return Attempt::Syntax(e.to_string()),
    };
    match yaml_to_json(value) {
        Ok(tree) => classify(tree),
        Err(e) => Attempt::Syntax(e),
    }
}

fn attempt_json(text: &str) -> Attempt {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(tree) => classify(tree),
        Err(e) => Attempt::Syntax(e.to_string()),
    }
}

fn classify(tree: JsonValue) -> Attempt {
    match SpecVersion::detect(&tree) {
        Ok(version) => Attempt::Parsed(version, tree),
        Err(VersionProblem::NotAnObject) => Attempt::NotOpenApi(format!(
            "parsed as {}, not an object",
            json_type_name(&tree)
        )),
        Err(problem) => Attempt::NotOpenApi(problem.to_string()),
    }
}

fn is_strict_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Convert a YAML value into the JSON data model.
///
/// Scalar mapping keys are stringified (`200:` becomes `"200"`), tags are
/// dropped, and mapping order is preserved.
pub(crate) fn yaml_to_json(value: YamlValue) -> Result<JsonValue, String> {
    Ok(match value {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::Bool(b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsonValue::from(i)
            } else if let Some(u) = n.as_u64() {
                JsonValue::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(JsonValue::Number)
                    .ok_or_else(|| format!("number {} has no JSON representation", n))?
            }
        }
        YamlValue::String(s) => JsonValue::String(s),
        YamlValue::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = serde_json::Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                object.insert(mapping_key(key)?, yaml_to_json(value)?);
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn mapping_key(key: YamlValue) -> Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        YamlValue::Tagged(tagged) => mapping_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("complex mapping keys are not supported".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_document() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: Test\n  version: '1.0'\npaths: {}\n";
        let doc = parse_document(yaml, FormatHint::Auto).unwrap();
        assert_eq!(doc.format(), SourceFormat::Yaml);
        assert_eq!(doc.version(), &SpecVersion::OpenApi3("3.0.0".to_string()));
        assert_eq!(doc.tree()["info"]["title"], "Test");
    }

    #[test]
    fn test_parse_json_document_with_auto_hint() {
        let json = r#"{"swagger": "2.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#;
        let doc = parse_document(json, FormatHint::Auto).unwrap();
        assert_eq!(doc.format(), SourceFormat::Json);
        assert_eq!(doc.version(), &SpecVersion::Swagger2("2.0".to_string()));
    }

    #[test]
    fn test_json_hint_accepts_yaml_content() {
        let yaml = "openapi: 3.1.0\ninfo:\n  title: T\n  version: '1'\n";
        let doc = parse_document(yaml, FormatHint::Json).unwrap();
        assert_eq!(doc.format(), SourceFormat::Yaml);
    }

    #[test]
    fn test_plain_string_is_not_openapi() {
        let err = parse_document("hello world", FormatHint::Auto).unwrap_err();
        match err {
            FormatError::NotOpenApi { yaml, json } => {
                assert!(yaml.contains("string"));
                assert!(!json.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_is_unparseable() {
        let err = parse_document("{ unclosed: [", FormatHint::Auto).unwrap_err();
        assert!(matches!(err, FormatError::Unparseable { .. }));
        assert!(err.to_string().contains("YAML error"));
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_object_without_discriminator() {
        let err = parse_document("info:\n  title: x\n", FormatHint::Auto).unwrap_err();
        assert!(matches!(err, FormatError::NotOpenApi { .. }));
    }

    #[test]
    fn test_numeric_response_keys_are_stringified() {
        let yaml = r#"
openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /pets:
    get:
      responses:
        200:
          description: ok
"#;
        let doc = parse_document(yaml, FormatHint::Yaml).unwrap();
        assert!(doc.tree().pointer("/paths/~1pets/get/responses/200").is_some());
    }

    #[test]
    fn test_mapping_order_preserved() {
        let yaml = "openapi: 3.0.0\nzeta: 1\nalpha: 2\nmid: 3\n";
        let doc = parse_document(yaml, FormatHint::Auto).unwrap();
        let keys: Vec<&str> = doc
            .tree()
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        assert_eq!(keys, vec!["openapi", "zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_fragment_accepts_bare_schema() {
        let value = parse_fragment("type: object\nproperties:\n  id: {type: integer}\n", FormatHint::Auto)
            .unwrap();
        assert_eq!(value["type"], "object");
    }

    #[test]
    fn test_hint_from_filename_and_url() {
        assert_eq!(FormatHint::from_filename("api.YML"), FormatHint::Yaml);
        assert_eq!(FormatHint::from_filename("api.json"), FormatHint::Json);
        assert_eq!(FormatHint::from_filename("api"), FormatHint::Json);
        assert_eq!(FormatHint::from_url("https://x.io/a.json?v=1"), FormatHint::Json);
        assert_eq!(FormatHint::from_url("https://x.io/spec"), FormatHint::Auto);
    }

    #[test]
    fn test_decode_text_strips_bom() {
        let bytes = b"\xef\xbb\xbfopenapi: 3.0.0";
        assert_eq!(decode_text(bytes).unwrap(), "openapi: 3.0.0");
        assert!(matches!(
            decode_text(&[0xff, 0xfe, 0x00]),
            Err(FormatError::Encoding(_))
        ));
    }
}
