//! Import pipeline
//!
//! One import runs fetch → parse → bundle → validate → serialize to
//! completion. Any failing stage aborts the rest; persistence only happens in
//! [`SpecImporter::import_and_store`], after every stage has succeeded.

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use super::format::{FormatHint, decode_text, parse_document};
use super::source::{Origin, RawSpecInput};
use super::{ImportedSpec, IngestError, IngestResult};
use crate::config::IngestConfig;
use crate::export::CanonicalSerializer;
use crate::fetch::{DefaultFetcher, DocumentFetcher, FetchError, FileFetcher};
use crate::models::{ParsedDocument, StoredSpec};
use crate::resolve::bundle;
use crate::storage::SpecStore;
use crate::validation::input::{MAX_OPENAPI_FILE_SIZE, validate_document_size};
use crate::validation::{ValidationOptions, validate};

/// Pipeline limits and switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Largest accepted uploaded document
    pub max_document_bytes: u64,
    /// Validation switches
    pub validation: ValidationOptions,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_document_bytes: MAX_OPENAPI_FILE_SIZE,
            validation: ValidationOptions::default(),
        }
    }
}

/// Runs imports against a [`DocumentFetcher`]
#[derive(Clone)]
pub struct SpecImporter {
    fetcher: Arc<dyn DocumentFetcher>,
    options: ImportOptions,
}

impl SpecImporter {
    /// Create an importer using `fetcher` for remote specs and external refs
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self {
            fetcher,
            options: ImportOptions::default(),
        }
    }

    /// Create an importer with the default fetcher, configured from `config`
    pub fn from_config(config: &IngestConfig) -> IngestResult<Self> {
        let fetch = config.fetch_options();
        let fetcher = DefaultFetcher::new(&fetch)?;
        Ok(Self::new(Arc::new(fetcher)).with_options(ImportOptions {
            max_document_bytes: fetch.max_document_bytes,
            validation: config.validation_options(),
        }))
    }

    /// Replace the pipeline options
    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import from a URL
    pub async fn import_url(&self, url: &str) -> IngestResult<ImportedSpec> {
        self.import(RawSpecInput::Url(url.to_string())).await
    }

    /// Import uploaded file bytes. Relative external refs resolve against
    /// the current directory.
    pub async fn import_file(&self, filename: &str, bytes: Vec<u8>) -> IngestResult<ImportedSpec> {
        self.import(RawSpecInput::File {
            filename: filename.to_string(),
            bytes,
            base_dir: None,
        })
        .await
    }

    /// Import a file from disk. Relative external refs resolve against the
    /// file's own directory.
    pub async fn import_path(&self, path: &Path) -> IngestResult<ImportedSpec> {
        let text = FileFetcher::new(self.options.max_document_bytes)
            .read(path)
            .await?;
        self.import(RawSpecInput::File {
            filename: path.display().to_string(),
            bytes: text.into_bytes(),
            base_dir: None,
        })
        .await
    }

    /// Import in-memory text with no retrieval location
    pub async fn import_text(&self, text: &str, hint: FormatHint) -> IngestResult<ImportedSpec> {
        validate_document_size(text.len() as u64, self.options.max_document_bytes)?;
        let parsed = parse_document(text, hint)?;
        self.finish(parsed, Origin::Inline).await
    }

    /// Run the whole pipeline for one input
    pub async fn import(&self, input: RawSpecInput) -> IngestResult<ImportedSpec> {
        let origin = input.origin().map_err(|reason| FetchError::Unsupported {
            location: input.location().to_string(),
            reason,
        })?;
        let hint = input.format_hint();

        let parsed = match input {
            RawSpecInput::Url(url) => {
                info!("Fetching OpenAPI document from {}", url);
                let text = self.fetcher.fetch(&origin).await?;
                info!("Fetched {} bytes from {}", text.len(), url);
                parse_document(&text, hint)?
            }
            RawSpecInput::File { filename, bytes, .. } => {
                validate_document_size(bytes.len() as u64, self.options.max_document_bytes)?;
                debug!("Parsing uploaded file {} ({} bytes)", filename, bytes.len());
                parse_document(decode_text(&bytes)?, hint)?
            }
        };

        self.finish(parsed, origin).await
    }

    /// Import and persist in one step. Nothing is saved when any stage fails.
    pub async fn import_and_store(
        &self,
        input: RawSpecInput,
        name: Option<&str>,
        store: &dyn SpecStore,
    ) -> IngestResult<StoredSpec> {
        let imported = self.import(input).await?;
        let record = store.save(imported.into_new_spec(name)?).await?;
        info!(
            "Stored spec '{}' as {} ({} backend)",
            record.name,
            record.id,
            store.backend_type()
        );
        Ok(record)
    }

    async fn finish(&self, parsed: ParsedDocument, origin: Origin) -> IngestResult<ImportedSpec> {
        let source_format = parsed.format();
        info!(
            "Detected {} document in {} format from {}",
            parsed.version(),
            source_format,
            origin
        );

        let bundled = bundle(parsed, &origin, self.fetcher.as_ref()).await?;
        let external_documents = bundled.external_documents();

        let document = validate(bundled, &self.options.validation)?;
        info!(
            "Validated {} document '{}'",
            document.version(),
            document.title().unwrap_or_default()
        );

        let serializer = CanonicalSerializer;
        let serialization = |e: crate::export::ExportError| IngestError::Serialization(e.to_string());
        let raw_content = serializer.to_yaml(document.tree()).map_err(serialization)?;
        let content = serializer.to_json(document.tree()).map_err(serialization)?;

        Ok(ImportedSpec {
            document,
            source_format,
            origin,
            raw_content,
            content,
            external_documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::models::SourceFormat;
    use std::path::PathBuf;

    const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Petstore
  version: "1.0"
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Pet"}
components:
  schemas:
    Pet: {type: object}
"##;

    fn importer(fetcher: MemoryFetcher) -> SpecImporter {
        SpecImporter::new(Arc::new(fetcher))
    }

    #[tokio::test]
    async fn test_import_file_yaml() {
        let imported = importer(MemoryFetcher::new())
            .import_file("petstore.yaml", PETSTORE.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(imported.source_format, SourceFormat::Yaml);
        assert_eq!(imported.document.title(), Some("Petstore"));
        assert_eq!(imported.external_documents, 0);
        assert!(imported.raw_content.contains("title: Petstore"));

        let content: serde_json::Value = serde_json::from_str(&imported.content).unwrap();
        assert_eq!(&content, imported.document.tree());
    }

    #[tokio::test]
    async fn test_import_url_uses_fetcher() {
        let origin = Origin::parse("https://example.com/petstore.yaml").unwrap();
        let fetcher = MemoryFetcher::new().with_document(origin.clone(), PETSTORE);
        let imported = importer(fetcher)
            .import_url("https://example.com/petstore.yaml")
            .await
            .unwrap();
        assert_eq!(imported.origin, origin);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let err = importer(MemoryFetcher::new())
            .import_url("https://example.com/missing.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let importer = importer(MemoryFetcher::new()).with_options(ImportOptions {
            max_document_bytes: 16,
            ..ImportOptions::default()
        });
        let err = importer
            .import_file("petstore.yaml", PETSTORE.as_bytes().to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Input(_)));
    }

    #[tokio::test]
    async fn test_external_refs_resolve_against_base_dir() {
        let root = r#"
swagger: "2.0"
info: {title: T, version: "1"}
paths: {}
definitions:
  Pet: {$ref: "pet.json"}
"#;
        let fetcher = MemoryFetcher::new().with_document(
            Origin::File(PathBuf::from("/specs/pet.json")),
            r#"{"type": "object"}"#,
        );
        let imported = importer(fetcher)
            .import(RawSpecInput::File {
                filename: "api.yaml".to_string(),
                bytes: root.as_bytes().to_vec(),
                base_dir: Some(PathBuf::from("/specs")),
            })
            .await
            .unwrap();
        assert_eq!(imported.external_documents, 1);
        assert_eq!(
            imported.document.tree()["definitions"]["Pet"],
            serde_json::json!({"type": "object"})
        );
    }

    #[test]
    fn test_display_name_fallbacks() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let imported = runtime
            .block_on(importer(MemoryFetcher::new()).import_text(PETSTORE, FormatHint::Auto))
            .unwrap();
        assert_eq!(imported.display_name(None).unwrap(), "Petstore");
        assert_eq!(imported.display_name(Some("  Mine ")).unwrap(), "Mine");
        assert!(imported.display_name(Some("   ")).is_err());
    }
}
