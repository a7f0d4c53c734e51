//! OpenAPI ingestion - shared library for importing OpenAPI/Swagger documents
//!
//! Provides unified interfaces for:
//! - Format detection and parsing (YAML or JSON, Swagger 2.0 or OpenAPI 3.x)
//! - `$ref` bundling across documents, with cycle detection
//! - Structural, meta-schema and reference-closure validation
//! - Canonical YAML/JSON serialization
//! - Schema dependency graphs
//! - Spec persistence (memory, filesystem, DuckDB)
//!
//! # Example
//!
//! ```no_run
//! use openapi_ingest::{DependencyGraph, IngestConfig, SpecImporter};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let importer = SpecImporter::from_config(&IngestConfig::default())?;
//! let imported = importer.import_url("https://example.com/openapi.yaml").await?;
//!
//! let graph = DependencyGraph::build(&imported.document);
//! for name in graph.unused_schemas() {
//!     println!("{} is defined but not used", name);
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dependency;
pub mod export;
pub mod fetch;
pub mod import;
pub mod models;
pub mod resolve;
pub mod session;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, IngestConfig, StoreBackendType};
pub use dependency::{DependencyError, DependencyGraph};
pub use export::{CanonicalSerializer, ExportError, ExportResult, OutputFormat};
pub use fetch::{DefaultFetcher, DocumentFetcher, FetchError, FetchOptions, MemoryFetcher};
pub use import::{
    FormatError, FormatHint, ImportedSpec, IngestError, IngestResult, Origin, RawSpecInput,
    SpecImporter,
};
pub use models::{
    BundledDocument, NewSpec, OperationUsage, ParsedDocument, SchemaUsage, SourceFormat,
    SpecSummary, SpecVersion, StoredSpec, UsageKind, ValidatedDocument,
};
pub use resolve::{ReferenceError, bundle, dereference};
pub use session::{ActiveSpec, SessionError, SpecSession};
pub use storage::{
    FileSystemSpecStore, MemorySpecStore, SpecStore, StorageError, StorageResult, open_store,
};
#[cfg(feature = "duckdb-backend")]
pub use storage::DuckDBSpecStore;
pub use validation::{ValidationError, ValidationOptions, Violation, validate};
