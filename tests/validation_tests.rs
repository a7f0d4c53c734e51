//! Validation tests, run through the import pipeline

use openapi_ingest::import::ImportOptions;
use openapi_ingest::{
    FormatHint, IngestError, MemoryFetcher, SpecImporter, ValidationError, ValidationOptions,
};
use std::sync::Arc;

fn importer(meta_schema: bool) -> SpecImporter {
    SpecImporter::new(Arc::new(MemoryFetcher::new())).with_options(ImportOptions {
        validation: ValidationOptions { meta_schema },
        ..ImportOptions::default()
    })
}

async fn violations(text: &str, meta_schema: bool) -> ValidationError {
    match importer(meta_schema).import_text(text, FormatHint::Auto).await {
        Err(IngestError::Validation(err)) => err,
        Err(other) => panic!("expected a validation failure, got {}", other),
        Ok(_) => panic!("expected a validation failure, document was accepted"),
    }
}

fn has(err: &ValidationError, path: &str, message: &str) -> bool {
    err.violations
        .iter()
        .any(|v| v.path == path && v.message.contains(message))
}

mod structure_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_info_fields() {
        let err = violations("openapi: 3.0.0\ninfo: {}\npaths: {}\n", false).await;
        assert_eq!(err.version, "OpenAPI 3.0.0");
        assert!(has(&err, "/info/title", "required field is missing"));
        assert!(has(&err, "/info/version", "required field is missing"));
    }

    #[tokio::test]
    async fn test_all_violations_reported_together() {
        let text = r#"
swagger: "2.0"
info:
  title: 7
  version: "1"
paths:
  pets:
    get:
      description: no responses
"#;
        let err = violations(text, false).await;
        assert!(has(&err, "/info/title", "must be a string"));
        assert!(has(&err, "/paths/pets", "path must begin with '/'"));
        assert!(has(&err, "/paths/pets/get/responses", "required field is missing"));
        assert!(err.violations.len() >= 3);
    }

    #[tokio::test]
    async fn test_paths_optional_from_3_1() {
        let text = "openapi: 3.1.0\ninfo:\n  title: Hooks\n  version: '1'\nwebhooks: {}\n";
        let imported = importer(false).import_text(text, FormatHint::Auto).await.unwrap();
        assert_eq!(imported.document.title(), Some("Hooks"));

        let err = violations("openapi: 3.0.3\ninfo:\n  title: T\n  version: '1'\n", false).await;
        assert!(has(&err, "/paths", "required field is missing"));
    }

    #[tokio::test]
    async fn test_error_message_lists_violations() {
        let err = violations("openapi: 3.0.0\ninfo: {}\npaths: {}\n", false).await;
        let message = IngestError::Validation(err).to_string();
        assert!(message.starts_with("OpenAPI validation failed (OpenAPI 3.0.0):"));
        assert!(message.contains("  - /info/title: required field is missing"));
    }
}

mod version_isolation_tests {
    use super::*;

    #[tokio::test]
    async fn test_v3_with_definitions_container() {
        let text = r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths: {}
definitions:
  Pet: {type: object}
"##;
        let err = violations(text, false).await;
        assert!(has(&err, "/definitions", "is not allowed"));
    }

    #[tokio::test]
    async fn test_v2_with_components_container() {
        let text = r##"
swagger: "2.0"
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    Pet: {type: object}
"##;
        let err = violations(text, false).await;
        assert!(has(&err, "/components", "is not allowed"));
    }

    #[tokio::test]
    async fn test_foreign_ref_prefix() {
        let text = r##"
swagger: "2.0"
info: {title: T, version: "1"}
paths: {}
definitions:
  Pets:
    type: array
    items:
      $ref: "#/components/schemas/Pet"
"##;
        let err = violations(text, false).await;
        assert!(has(
            &err,
            "/definitions/Pets/items/$ref",
            "does not address a schema"
        ));
    }
}

mod reference_tests {
    use super::*;

    #[tokio::test]
    async fn test_unresolved_internal_ref() {
        let text = r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    Pets:
      type: array
      items:
        $ref: "#/components/schemas/Pet"
"##;
        let err = violations(text, false).await;
        assert!(has(
            &err,
            "/components/schemas/Pets/items/$ref",
            "unresolved reference"
        ));
    }

    #[tokio::test]
    async fn test_recursive_schema_is_valid() {
        let text = r##"
openapi: 3.0.0
info: {title: T, version: "1"}
paths: {}
components:
  schemas:
    Node:
      type: object
      properties:
        next:
          $ref: "#/components/schemas/Node"
"##;
        let imported = importer(true).import_text(text, FormatHint::Auto).await.unwrap();
        assert_eq!(imported.document.schema_names(), vec!["Node"]);
    }
}

#[cfg(feature = "schema-validation")]
mod meta_schema_tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_root_field_rejected() {
        let text = "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths: {}\nbogus: true\n";
        let err = violations(text, true).await;
        assert!(err.violations.iter().any(|v| v.message.starts_with("meta-schema:")));

        // Extensions are allowed
        let text = "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths: {}\nx-internal: true\n";
        assert!(importer(true).import_text(text, FormatHint::Auto).await.is_ok());
    }

    #[tokio::test]
    async fn test_violation_points_at_offending_node() {
        let text = r#"
openapi: 3.0.0
info: {title: T, version: '1'}
paths:
  /pets:
    get:
      parameters:
        - {name: id, in: cookiejar}
      responses:
        "200": {description: ok}
"#;
        let err = violations(text, true).await;
        assert!(has(&err, "/paths/~1pets/get/parameters/0", "meta-schema:"));
    }

    #[tokio::test]
    async fn test_meta_schema_can_be_disabled() {
        let text = "openapi: 3.0.0\ninfo: {title: T, version: '1'}\npaths: {}\nbogus: true\n";
        assert!(importer(false).import_text(text, FormatHint::Auto).await.is_ok());
    }
}
