//! Meta-schema validation
//!
//! Documents are checked against embedded JSON Schemas describing the
//! Swagger 2.0 and OpenAPI 3.x object models. The schemas are compiled once
//! per process.

use serde_json::Value as JsonValue;

use super::Violation;
use crate::models::SpecVersion;

/// Embedded Swagger 2.0 meta-schema
pub const SWAGGER_2_SCHEMA: &str = include_str!("../../schemas/swagger-2.0.json");

/// Embedded OpenAPI 3.x meta-schema
pub const OPENAPI_3_SCHEMA: &str = include_str!("../../schemas/openapi-3.x.json");

/// Append every meta-schema violation in `tree` to `out`
#[cfg(feature = "schema-validation")]
pub fn check(version: &SpecVersion, tree: &JsonValue, out: &mut Vec<Violation>) {
    match compiled(version) {
        Ok(validator) => {
            for error in validator.iter_errors(tree) {
                out.push(Violation::new(
                    error.instance_path().as_str(),
                    format!("meta-schema: {}", error),
                ));
            }
        }
        Err(message) => out.push(Violation::new("", message.clone())),
    }
}

/// Meta-schema validation is compiled out; nothing is checked
#[cfg(not(feature = "schema-validation"))]
pub fn check(_version: &SpecVersion, _tree: &JsonValue, _out: &mut Vec<Violation>) {
    tracing::debug!("Meta-schema validation disabled - feature not enabled");
}

#[cfg(feature = "schema-validation")]
fn compiled(version: &SpecVersion) -> Result<&'static jsonschema::Validator, &'static String> {
    use std::sync::OnceLock;

    static SWAGGER_2: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();
    static OPENAPI_3: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();

    let (cell, source, label) = match version {
        SpecVersion::Swagger2(_) => (&SWAGGER_2, SWAGGER_2_SCHEMA, "Swagger 2.0"),
        SpecVersion::OpenApi3(_) => (&OPENAPI_3, OPENAPI_3_SCHEMA, "OpenAPI 3.x"),
    };
    cell.get_or_init(|| compile(source, label)).as_ref()
}

#[cfg(feature = "schema-validation")]
fn compile(source: &str, label: &str) -> Result<jsonschema::Validator, String> {
    let schema: JsonValue = serde_json::from_str(source)
        .map_err(|e| format!("Failed to load {} meta-schema: {}", label, e))?;
    jsonschema::validator_for(&schema)
        .map_err(|e| format!("Failed to compile {} meta-schema: {}", label, e))
}
