//! Spec persistence
//!
//! A [`SpecStore`] keeps one record per successful import. Records are
//! created once and never updated in place; re-importing the same document
//! creates a new record.
//!
//! Backends:
//! - [`MemorySpecStore`]: process-local map, for tests and one-shot use
//! - [`FileSystemSpecStore`]: one JSON file per record under a directory
//! - `DuckDBSpecStore`: embedded DuckDB table (feature `duckdb-backend`)

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{IngestConfig, StoreBackendType};
use crate::models::{NewSpec, SpecSummary, StoredSpec};

#[cfg(feature = "duckdb-backend")]
pub mod duckdb;
pub mod filesystem;
pub mod memory;

#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDBSpecStore;
pub use filesystem::FileSystemSpecStore;
pub use memory::MemorySpecStore;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No record with this id
    #[error("Spec not found: {0}")]
    NotFound(Uuid),

    /// Filesystem failure
    #[error("IO error: {0}")]
    IoError(String),

    /// A record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The storage engine reported a failure
    #[error("Backend error: {0}")]
    BackendError(String),

    /// The configured backend is not compiled in
    #[error("Storage backend '{0}' is not available in this build")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for imported specs
#[async_trait]
pub trait SpecStore: Send + Sync {
    /// Persist a new record, assigning its id and timestamps
    async fn save(&self, spec: NewSpec) -> StorageResult<StoredSpec>;

    /// Summaries of every record, newest first
    async fn list(&self) -> StorageResult<Vec<SpecSummary>>;

    /// Load one record
    async fn get(&self, id: Uuid) -> StorageResult<StoredSpec>;

    /// Remove one record
    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Backend name, for logging
    fn backend_type(&self) -> &'static str;
}

/// Open the store selected by `config`.
///
/// Relative store paths are resolved against `workspace`.
pub async fn open_store(
    config: &IngestConfig,
    workspace: &Path,
) -> StorageResult<Arc<dyn SpecStore>> {
    let path = config.store_path(workspace);

    match config.store.backend {
        StoreBackendType::Memory => Ok(Arc::new(MemorySpecStore::new())),
        StoreBackendType::FileSystem => Ok(Arc::new(FileSystemSpecStore::open(path).await?)),
        #[cfg(feature = "duckdb-backend")]
        StoreBackendType::DuckDB => Ok(Arc::new(DuckDBSpecStore::open(path)?)),
        #[cfg(not(feature = "duckdb-backend"))]
        StoreBackendType::DuckDB => {
            let _ = path;
            Err(StorageError::Unavailable(
                "duckdb (rebuild with the 'duckdb-backend' feature)".to_string(),
            ))
        }
    }
}

/// Sort summaries newest first; ties keep a stable order by id
pub(crate) fn newest_first(summaries: &mut [SpecSummary]) {
    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}
