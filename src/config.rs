//! Configuration file support
//!
//! Handles parsing of `.openapi-ingest.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::validation::ValidationOptions;
use crate::validation::input::MAX_OPENAPI_FILE_SIZE;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".openapi-ingest.toml";

/// Default store location (directory, or database file for DuckDB)
pub const DEFAULT_STORE_PATH: &str = ".openapi-specs";

/// Environment variable for the fetch timeout in seconds
pub const ENV_FETCH_TIMEOUT_SECS: &str = "OPENAPI_INGEST_FETCH_TIMEOUT_SECS";

/// Environment variable for the document size limit in bytes
pub const ENV_MAX_DOCUMENT_BYTES: &str = "OPENAPI_INGEST_MAX_DOCUMENT_BYTES";

/// Environment variable for the store backend
pub const ENV_STORE_BACKEND: &str = "OPENAPI_INGEST_STORE_BACKEND";

/// Environment variable for the store path
pub const ENV_STORE_PATH: &str = "OPENAPI_INGEST_STORE_PATH";

/// Error type for configuration handling
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Spec store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendType {
    /// Process-local map; nothing survives the process
    Memory,
    /// One JSON file per record (default)
    #[default]
    FileSystem,
    /// Embedded DuckDB database
    DuckDB,
}

impl std::str::FromStr for StoreBackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreBackendType::Memory),
            "filesystem" | "fs" => Ok(StoreBackendType::FileSystem),
            "duckdb" => Ok(StoreBackendType::DuckDB),
            _ => Err(format!(
                "Unknown store backend: {}. Use 'memory', 'filesystem' or 'duckdb'.",
                s
            )),
        }
    }
}

impl std::fmt::Display for StoreBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackendType::Memory => write!(f, "memory"),
            StoreBackendType::FileSystem => write!(f, "filesystem"),
            StoreBackendType::DuckDB => write!(f, "duckdb"),
        }
    }
}

/// Retrieval configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchSection {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest accepted document in bytes
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,

    /// `User-Agent` header; the crate name and version when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_document_bytes() -> u64 {
    MAX_OPENAPI_FILE_SIZE
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_document_bytes: default_max_document_bytes(),
            user_agent: None,
        }
    }
}

/// Store configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreSection {
    /// Store backend type
    #[serde(default)]
    pub backend: StoreBackendType,

    /// Store directory or database file (relative to workspace, or absolute)
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    DEFAULT_STORE_PATH.to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackendType::default(),
            path: default_store_path(),
        }
    }
}

/// Validation configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationSection {
    /// Check documents against the embedded OpenAPI meta-schemas
    #[serde(default = "default_meta_schema")]
    pub meta_schema: bool,
}

fn default_meta_schema() -> bool {
    true
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            meta_schema: default_meta_schema(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `.openapi-ingest.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IngestConfig {
    /// Retrieval configuration
    #[serde(default)]
    pub fetch: FetchSection,

    /// Store configuration
    #[serde(default)]
    pub store: StoreSection,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationSection,
}

impl IngestConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a workspace directory
    ///
    /// Looks for `.openapi-ingest.toml` in the workspace directory.
    /// Falls back to defaults if not found.
    pub fn load(workspace_path: &Path) -> ConfigResult<Self> {
        let config_path = workspace_path.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a workspace directory
    pub fn save(&self, workspace_path: &Path) -> ConfigResult<()> {
        let config_path = workspace_path.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| ConfigError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source; unparseable values are
    /// ignored
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(secs) = var(ENV_FETCH_TIMEOUT_SECS)
            && let Ok(secs) = secs.trim().parse()
        {
            self.fetch.timeout_secs = secs;
        }

        if let Some(bytes) = var(ENV_MAX_DOCUMENT_BYTES)
            && let Ok(bytes) = bytes.trim().parse()
        {
            self.fetch.max_document_bytes = bytes;
        }

        if let Some(backend) = var(ENV_STORE_BACKEND)
            && let Ok(backend) = backend.parse()
        {
            self.store.backend = backend;
        }

        if let Some(path) = var(ENV_STORE_PATH) {
            self.store.path = path;
        }
    }

    /// Get the store path for a workspace
    pub fn store_path(&self, workspace_path: &Path) -> PathBuf {
        if self.store.path.is_empty() {
            workspace_path.join(DEFAULT_STORE_PATH)
        } else if Path::new(&self.store.path).is_absolute() {
            PathBuf::from(&self.store.path)
        } else {
            workspace_path.join(&self.store.path)
        }
    }

    /// Retrieval limits for the fetchers
    pub fn fetch_options(&self) -> FetchOptions {
        let defaults = FetchOptions::default();
        FetchOptions {
            timeout: Duration::from_secs(self.fetch.timeout_secs),
            max_document_bytes: self.fetch.max_document_bytes,
            user_agent: self.fetch.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Validation switches
    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            meta_schema: self.validation.meta_schema,
        }
    }

    /// Check if configuration exists in a workspace
    pub fn exists(workspace_path: &Path) -> bool {
        workspace_path.join(CONFIG_FILENAME).exists()
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# openapi-ingest configuration

[fetch]
# Timeout for each HTTP request, in seconds
timeout_secs = 30

# Largest accepted document (primary spec or external $ref target), in bytes
max_document_bytes = 5242880

# User-Agent header sent with HTTP requests
# user_agent = "my-tool/1.0"

[store]
# Store backend: "filesystem" (default), "memory" or "duckdb"
backend = "filesystem"

# Store directory, or database file for duckdb (relative to workspace, or absolute)
path = ".openapi-specs"

[validation]
# Check documents against the embedded OpenAPI meta-schemas
meta_schema = true
"#
}
