//! Filesystem spec store
//!
//! Layout:
//! - Store directory (e.g. `.openapi-specs/`)
//!   - `{id}.json` - one camelCase [`StoredSpec`] per record
//!
//! Files are written to a temporary name and renamed into place, so a reader
//! never sees a half-written record.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{SpecStore, StorageError, StorageResult, newest_first};
use crate::models::{NewSpec, SpecSummary, StoredSpec};

const RECORD_EXTENSION: &str = "json";

/// Stores each record as a JSON file
#[derive(Debug, Clone)]
pub struct FileSystemSpecStore {
    root: PathBuf,
}

impl FileSystemSpecStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub async fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::IoError(format!("Failed to create {}: {}", root.display(), e))
        })?;
        debug!("Opened filesystem spec store at {}", root.display());
        Ok(Self { root })
    }

    /// Store directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    async fn read_record(path: &Path) -> StorageResult<StoredSpec> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            StorageError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            StorageError::SerializationError(format!("Invalid record {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl SpecStore for FileSystemSpecStore {
    async fn save(&self, spec: NewSpec) -> StorageResult<StoredSpec> {
        let record = StoredSpec::create(spec);
        let json = serde_json::to_string_pretty(&record).map_err(|e| {
            StorageError::SerializationError(format!("Failed to serialize record: {}", e))
        })?;

        let path = self.record_path(record.id);
        let temp = path.with_extension("json.tmp");
        tokio::fs::write(&temp, json).await.map_err(|e| {
            StorageError::IoError(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        tokio::fs::rename(&temp, &path).await.map_err(|e| {
            StorageError::IoError(format!("Failed to move record into {}: {}", path.display(), e))
        })?;

        info!("Saved spec '{}' to {}", record.name, path.display());
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<SpecSummary>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            StorageError::IoError(format!("Failed to list {}: {}", self.root.display(), e))
        })?;

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(record) => summaries.push(record.summary()),
                Err(e) => warn!("Skipping unreadable record: {}", e),
            }
        }

        newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn get(&self, id: Uuid) -> StorageResult<StoredSpec> {
        let path = self.record_path(id);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(id));
        }
        Self::read_record(&path).await
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let path = self.record_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted spec {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
            Err(e) => Err(StorageError::IoError(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> &'static str {
        "filesystem"
    }
}
