//! DuckDB spec store
//!
//! Keeps records in a single `specs` table of an embedded DuckDB database.
//! Timestamps are stored as RFC 3339 text.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use super::{SpecStore, StorageError, StorageResult, newest_first};
use crate::models::{NewSpec, SpecSummary, StoredSpec};

const CREATE_SPECS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS specs (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    content VARCHAR NOT NULL,
    raw_content VARCHAR NOT NULL,
    created_at VARCHAR NOT NULL,
    updated_at VARCHAR NOT NULL
);
"#;

/// DuckDB-backed spec store
pub struct DuckDBSpecStore {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    /// DuckDB connection (wrapped in Mutex for thread safety)
    connection: Mutex<duckdb::Connection>,
}

impl DuckDBSpecStore {
    /// Open (or create) a file-based store and ensure the `specs` table exists
    pub fn open(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let connection = duckdb::Connection::open(&path).map_err(|e| {
            StorageError::BackendError(format!("Failed to open DuckDB: {}", e))
        })?;

        let store = Self {
            db_path: Some(path),
            connection: Mutex::new(connection),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> StorageResult<Self> {
        let connection = duckdb::Connection::open_in_memory().map_err(|e| {
            StorageError::BackendError(format!("Failed to create in-memory DuckDB: {}", e))
        })?;

        let store = Self {
            db_path: None,
            connection: Mutex::new(connection),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn connection(&self) -> StorageResult<MutexGuard<'_, duckdb::Connection>> {
        self.connection
            .lock()
            .map_err(|e| StorageError::BackendError(format!("Lock error: {}", e)))
    }

    fn initialize(&self) -> StorageResult<()> {
        self.connection()?
            .execute_batch(CREATE_SPECS_TABLE)
            .map_err(|e| StorageError::BackendError(format!("Failed to create specs table: {}", e)))?;
        debug!("Initialized DuckDB spec store");
        Ok(())
    }
}

fn query_failed(e: duckdb::Error) -> StorageError {
    StorageError::BackendError(format!("Query failed: {}", e))
}

fn parse_id(text: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| StorageError::SerializationError(format!("Invalid id '{}': {}", text, e)))
}

fn parse_timestamp(text: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::SerializationError(format!("Invalid timestamp '{}': {}", text, e))
        })
}

#[async_trait]
impl SpecStore for DuckDBSpecStore {
    async fn save(&self, spec: NewSpec) -> StorageResult<StoredSpec> {
        let record = StoredSpec::create(spec);
        self.connection()?
            .execute(
                "INSERT INTO specs (id, name, content, raw_content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
                duckdb::params![
                    record.id.to_string(),
                    &record.name,
                    &record.content,
                    &record.raw_content,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StorageError::BackendError(format!("Failed to insert spec: {}", e)))?;

        info!("Saved spec '{}' ({}) to DuckDB", record.name, record.id);
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<SpecSummary>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT id, name, created_at, updated_at FROM specs")
            .map_err(query_failed)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(query_failed)?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, created_at, updated_at) = row.map_err(query_failed)?;
            summaries.push(SpecSummary {
                id: parse_id(&id)?,
                name,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            });
        }
        newest_first(&mut summaries);
        Ok(summaries)
    }

    async fn get(&self, id: Uuid) -> StorageResult<StoredSpec> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT name, content, raw_content, created_at, updated_at FROM specs WHERE id = ?",
            )
            .map_err(query_failed)?;
        let mut rows = stmt
            .query_map([id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(query_failed)?;

        let Some(row) = rows.next() else {
            return Err(StorageError::NotFound(id));
        };
        let (name, content, raw_content, created_at, updated_at) = row.map_err(query_failed)?;
        Ok(StoredSpec {
            id,
            name,
            content,
            raw_content,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let deleted = self
            .connection()?
            .execute("DELETE FROM specs WHERE id = ?", [id.to_string()])
            .map_err(query_failed)?;
        if deleted == 0 {
            return Err(StorageError::NotFound(id));
        }
        info!("Deleted spec {} from DuckDB", id);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "duckdb"
    }
}
