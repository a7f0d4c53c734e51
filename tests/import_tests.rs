//! Import pipeline tests

use openapi_ingest::{
    FetchError, FormatError, FormatHint, IngestError, MemoryFetcher, Origin, RawSpecInput,
    ReferenceError, SourceFormat, SpecImporter, SpecVersion,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PETSTORE_YAML: &str = r##"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets/{id}:
    get:
      responses:
        "200":
          description: A pet
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      properties:
        name:
          type: string
"##;

const PETSTORE_JSON: &str = r##"{
  "openapi": "3.0.3",
  "info": {"title": "Petstore", "version": "1.0.0"},
  "paths": {
    "/pets/{id}": {
      "get": {
        "responses": {
          "200": {
            "description": "A pet",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
          }
        }
      }
    }
  },
  "components": {"schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}}
}"##;

fn importer() -> SpecImporter {
    SpecImporter::new(Arc::new(MemoryFetcher::new()))
}

fn disk_importer() -> SpecImporter {
    SpecImporter::from_config(&openapi_ingest::IngestConfig::default()).unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

mod format_tests {
    use super::*;

    #[tokio::test]
    async fn test_yaml_and_json_yield_same_tree() {
        let from_yaml = importer()
            .import_file("petstore.yaml", PETSTORE_YAML.as_bytes().to_vec())
            .await
            .unwrap();
        let from_json = importer()
            .import_file("petstore.json", PETSTORE_JSON.as_bytes().to_vec())
            .await
            .unwrap();

        assert_eq!(from_yaml.source_format, SourceFormat::Yaml);
        assert_eq!(from_json.source_format, SourceFormat::Json);
        assert_eq!(from_yaml.document.tree(), from_json.document.tree());
        assert_eq!(from_yaml.content, from_json.content);
        assert_eq!(from_yaml.raw_content, from_json.raw_content);
    }

    #[tokio::test]
    async fn test_misleading_extension_still_parses() {
        let imported = importer()
            .import_file("petstore.json", PETSTORE_YAML.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(imported.source_format, SourceFormat::Yaml);
        assert_eq!(imported.document.title(), Some("Petstore"));
    }

    #[tokio::test]
    async fn test_plain_scalar_is_not_openapi() {
        for hint in [FormatHint::Auto, FormatHint::Yaml, FormatHint::Json] {
            let err = importer().import_text("hello world", hint).await.unwrap_err();
            assert!(
                matches!(err, IngestError::Parse(FormatError::NotOpenApi { .. })),
                "unexpected error for {:?}: {}",
                hint,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_garbage_is_unparseable() {
        let err = importer()
            .import_text("{ unclosed: [", FormatHint::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Parse(FormatError::Unparseable { .. })));
    }

    #[tokio::test]
    async fn test_mixed_discriminators_rejected() {
        let text = r#"{"swagger": "2.0", "openapi": "3.0.0", "info": {"title": "T", "version": "1"}, "paths": {}}"#;
        let err = importer().import_text(text, FormatHint::Json).await.unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
        assert!(err.to_string().contains("both 'swagger' and 'openapi'"));
    }

    #[tokio::test]
    async fn test_swagger_document() {
        let text = r##"
swagger: "2.0"
info:
  title: Legacy
  version: "1"
paths:
  /orders:
    post:
      parameters:
        - in: body
          name: order
          schema:
            $ref: "#/definitions/Order"
      responses:
        "201":
          description: created
definitions:
  Order:
    type: object
"##;
        let imported = importer().import_text(text, FormatHint::Auto).await.unwrap();
        assert_eq!(
            imported.document.version(),
            &SpecVersion::Swagger2("2.0".to_string())
        );
        assert_eq!(imported.document.schema_names(), vec!["Order"]);
        assert_eq!(imported.origin, Origin::Inline);
    }
}

mod source_tests {
    use super::*;

    #[tokio::test]
    async fn test_import_url_uses_fetcher() {
        let origin = Origin::parse("https://api.example.com/v1/openapi").unwrap();
        let fetcher = MemoryFetcher::new().with_document(origin.clone(), PETSTORE_JSON);
        let imported = SpecImporter::new(Arc::new(fetcher))
            .import_url("https://api.example.com/v1/openapi")
            .await
            .unwrap();

        assert_eq!(imported.origin, origin);
        assert_eq!(imported.source_format, SourceFormat::Json);
        assert_eq!(imported.external_documents, 0);
    }

    #[tokio::test]
    async fn test_url_import_refuses_local_file_refs() {
        let origin = Origin::parse("https://api.example.com/v1/openapi.yaml").unwrap();
        let text = PETSTORE_YAML.replace("#/components/schemas/Pet", "file:///etc/passwd");
        let fetcher = MemoryFetcher::new()
            .with_document(origin, text)
            .with_document(Origin::File(PathBuf::from("/etc/passwd")), "root: x\n");

        let err = SpecImporter::new(Arc::new(fetcher))
            .import_url("https://api.example.com/v1/openapi.yaml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Reference(ReferenceError::Broken { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_url() {
        let err = importer()
            .import_url("https://api.example.com/missing.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Fetch(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = importer()
            .import(RawSpecInput::Url("http://".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Fetch(FetchError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn test_import_path_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "petstore.yaml", PETSTORE_YAML);

        let imported = disk_importer().import_path(&path).await.unwrap();
        assert_eq!(imported.document.title(), Some("Petstore"));
        assert!(matches!(imported.origin, Origin::File(_)));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = disk_importer()
            .import_path(&dir.path().join("absent.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Fetch(FetchError::File { .. })));
    }
}

mod bundling_tests {
    use super::*;

    const ROOT: &str = r##"
openapi: 3.0.3
info:
  title: Split
  version: "1"
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "./schemas/pet.yaml"
  /owners:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "./schemas/owner.yaml"
"##;

    const PET: &str = r##"
type: object
properties:
  owner:
    $ref: "./owner.yaml"
"##;

    const OWNER: &str = r##"
type: object
properties:
  name:
    type: string
"##;

    #[tokio::test]
    async fn test_multi_file_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        let root = write(dir.path(), "openapi.yaml", ROOT);
        write(&dir.path().join("schemas"), "pet.yaml", PET);
        write(&dir.path().join("schemas"), "owner.yaml", OWNER);

        let imported = disk_importer().import_path(&root).await.unwrap();
        assert_eq!(imported.external_documents, 2);
        assert!(!imported.content.contains("pet.yaml"));
        assert!(!imported.content.contains("owner.yaml"));

        // Every remaining ref is internal and resolvable
        let tree = imported.document.tree();
        let refs = openapi_ingest::resolve::reference::collect_refs(tree);
        assert!(!refs.is_empty());
        for (_, reference) in refs {
            assert!(reference.starts_with('#'), "external ref left: {}", reference);
            openapi_ingest::resolve::reference::resolve_internal(tree, &reference).unwrap();
        }
    }

    #[tokio::test]
    async fn test_missing_external_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(dir.path(), "openapi.yaml", ROOT);

        let err = disk_importer().import_path(&root).await.unwrap_err();
        match err {
            IngestError::Reference(ReferenceError::Unreachable { location, .. }) => {
                assert!(location.ends_with("pet.yaml") || location.ends_with("owner.yaml"));
            }
            other => panic!("expected unreachable reference, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_broken_pointer_in_external_document() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(
            dir.path(),
            "openapi.yaml",
            &ROOT.replace("./schemas/owner.yaml", "./schemas/owner.yaml#/nothing/here"),
        );
        std::fs::create_dir(dir.path().join("schemas")).unwrap();
        write(&dir.path().join("schemas"), "pet.yaml", PET);
        write(&dir.path().join("schemas"), "owner.yaml", OWNER);

        let err = disk_importer().import_path(&root).await.unwrap_err();
        assert!(matches!(
            err,
            IngestError::Reference(ReferenceError::Broken { .. })
        ));
    }

    #[tokio::test]
    async fn test_cyclic_documents_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let root = write(
            dir.path(),
            "openapi.yaml",
            r##"
openapi: 3.0.3
info:
  title: Cycle
  version: "1"
paths: {}
components:
  schemas:
    A:
      $ref: "./a.yaml"
"##,
        );
        write(dir.path(), "a.yaml", "properties:\n  b:\n    $ref: ./b.yaml\n");
        write(dir.path(), "b.yaml", "properties:\n  a:\n    $ref: ./a.yaml\n");

        let err = disk_importer().import_path(&root).await.unwrap_err();
        match err {
            IngestError::Reference(ReferenceError::Cyclic { chain }) => {
                assert!(chain.iter().any(|d| d.ends_with("a.yaml")));
                assert!(chain.iter().any(|d| d.ends_with("b.yaml")));
            }
            other => panic!("expected cyclic reference, got {}", other),
        }
    }
}
