//! In-memory spec store

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{SpecStore, StorageError, StorageResult, newest_first};
use crate::models::{NewSpec, SpecSummary, StoredSpec};

/// Keeps records in a process-local map
#[derive(Debug, Default)]
pub struct MemorySpecStore {
    records: RwLock<IndexMap<Uuid, StoredSpec>>,
}

impl MemorySpecStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SpecStore for MemorySpecStore {
    async fn save(&self, spec: NewSpec) -> StorageResult<StoredSpec> {
        let record = StoredSpec::create(spec);
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<SpecSummary>> {
        let mut summaries: Vec<SpecSummary> = self
            .records
            .read()
            .await
            .values()
            .map(StoredSpec::summary)
            .collect();
        newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn get(&self, id: Uuid) -> StorageResult<StoredSpec> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        self.records
            .write()
            .await
            .shift_remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound(id))
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> NewSpec {
        NewSpec {
            name: name.to_string(),
            content: "{}".to_string(),
            raw_content: "{}\n".to_string(),
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let store = MemorySpecStore::new();
        let saved = store.save(spec("Petstore")).await.unwrap();

        assert_eq!(store.get(saved.id).await.unwrap(), saved);
        assert_eq!(store.len().await, 1);

        store.delete(saved.id).await.unwrap();
        assert!(store.is_empty().await);
        assert!(matches!(
            store.get(saved.id).await,
            Err(StorageError::NotFound(id)) if id == saved.id
        ));
        assert!(store.delete(saved.id).await.is_err());
    }

    #[tokio::test]
    async fn test_saving_twice_creates_two_records() {
        let store = MemorySpecStore::new();
        let a = store.save(spec("Petstore")).await.unwrap();
        let b = store.save(spec("Petstore")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }
}
