//! Document retrieval
//!
//! Fetching is abstracted behind [`DocumentFetcher`] so the import pipeline
//! and the bundler can be driven by HTTP, the local filesystem, or an
//! in-memory map in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::import::Origin;
use crate::validation::input::{MAX_OPENAPI_FILE_SIZE, validate_document_size};

#[cfg(feature = "http-fetch")]
pub mod http;

#[cfg(feature = "http-fetch")]
pub use http::HttpFetcher;

/// Longest error-body excerpt carried in a [`FetchError::Status`]
const MAX_ERROR_DETAIL_CHARS: usize = 200;

/// Error type for document retrieval
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FetchError {
    /// Name resolution failed
    #[error("DNS lookup failed for {url}: {message}")]
    Dns { url: String, message: String },

    /// The request did not complete in time
    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// Connection or transport failure
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} fetching {url}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },

    /// Local file could not be read
    #[error("Failed to read {path}: {message}")]
    File { path: PathBuf, message: String },

    /// Document exceeds the configured size limit
    #[error("Document {location} is too large (max: {max} bytes, got: {actual} bytes)")]
    TooLarge {
        location: String,
        max: u64,
        actual: u64,
    },

    /// Content is not UTF-8 text
    #[error("Document {location} is not valid UTF-8")]
    Encoding { location: String },

    /// This fetcher cannot retrieve the requested origin
    #[error("Cannot fetch {location}: {reason}")]
    Unsupported { location: String, reason: String },
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Retrieves the text of a document
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the document at `origin` as UTF-8 text
    async fn fetch(&self, origin: &Origin) -> FetchResult<String>;
}

/// Limits applied to every retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Per-request timeout
    pub timeout: Duration,
    /// Largest accepted document
    pub max_document_bytes: u64,
    /// `User-Agent` header for HTTP requests
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_document_bytes: MAX_OPENAPI_FILE_SIZE,
            user_agent: format!("openapi-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Reads documents from the local filesystem
#[derive(Debug, Clone)]
pub struct FileFetcher {
    max_document_bytes: u64,
}

impl FileFetcher {
    /// Create a file fetcher with the given size limit
    pub fn new(max_document_bytes: u64) -> Self {
        Self { max_document_bytes }
    }

    /// Read one file, enforcing the size limit before loading it
    pub async fn read(&self, path: &std::path::Path) -> FetchResult<String> {
        let io_error = |e: std::io::Error| FetchError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let metadata = tokio::fs::metadata(path).await.map_err(io_error)?;
        check_size(&path.display().to_string(), metadata.len(), self.max_document_bytes)?;

        let bytes = tokio::fs::read(path).await.map_err(io_error)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        into_text(&path.display().to_string(), bytes)
    }
}

#[async_trait]
impl DocumentFetcher for FileFetcher {
    async fn fetch(&self, origin: &Origin) -> FetchResult<String> {
        match origin {
            Origin::File(path) => self.read(path).await,
            other => Err(FetchError::Unsupported {
                location: other.to_string(),
                reason: "only local files can be read by this fetcher".to_string(),
            }),
        }
    }
}

/// Serves documents from an in-memory map.
///
/// Useful for offline imports where every referenced document is already at
/// hand, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<Origin, String>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the text served for `origin`
    pub fn insert(&mut self, origin: Origin, text: impl Into<String>) {
        self.documents.insert(origin, text.into());
    }

    /// Builder-style [`MemoryFetcher::insert`]
    pub fn with_document(mut self, origin: Origin, text: impl Into<String>) -> Self {
        self.insert(origin, text);
        self
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, origin: &Origin) -> FetchResult<String> {
        match self.documents.get(origin) {
            Some(text) => Ok(text.clone()),
            None => match origin {
                Origin::File(path) => Err(FetchError::File {
                    path: path.clone(),
                    message: "No such file or directory".to_string(),
                }),
                other => Err(FetchError::Network {
                    url: other.to_string(),
                    message: "no document registered for this location".to_string(),
                }),
            },
        }
    }
}

/// Fetcher used by default: HTTP(S) when the `http-fetch` feature is
/// enabled, local files always
pub struct DefaultFetcher {
    files: FileFetcher,
    #[cfg(feature = "http-fetch")]
    http: HttpFetcher,
}

impl DefaultFetcher {
    /// Build a fetcher from the given options
    pub fn new(options: &FetchOptions) -> FetchResult<Self> {
        Ok(Self {
            files: FileFetcher::new(options.max_document_bytes),
            #[cfg(feature = "http-fetch")]
            http: HttpFetcher::new(options)?,
        })
    }
}

#[async_trait]
impl DocumentFetcher for DefaultFetcher {
    async fn fetch(&self, origin: &Origin) -> FetchResult<String> {
        match origin {
            Origin::File(path) => self.files.read(path).await,
            #[cfg(feature = "http-fetch")]
            Origin::Url(_) => self.http.fetch(origin).await,
            #[cfg(not(feature = "http-fetch"))]
            Origin::Url(url) => Err(FetchError::Unsupported {
                location: url.to_string(),
                reason: "built without the 'http-fetch' feature".to_string(),
            }),
            Origin::Inline => Err(FetchError::Unsupported {
                location: origin.to_string(),
                reason: "inline documents have no retrievable location".to_string(),
            }),
        }
    }
}

pub(crate) fn check_size(location: &str, actual: u64, max: u64) -> FetchResult<()> {
    validate_document_size(actual, max).map_err(|_| FetchError::TooLarge {
        location: location.to_string(),
        max,
        actual,
    })
}

pub(crate) fn into_text(location: &str, bytes: Vec<u8>) -> FetchResult<String> {
    String::from_utf8(bytes).map_err(|_| FetchError::Encoding {
        location: location.to_string(),
    })
}

/// Summarize a non-success response body.
///
/// JSON bodies contribute their `message`/`error`/`detail`/`title` field,
/// HTML error pages their `<title>`, and plain text a trimmed excerpt.
pub fn describe_error_body(content_type: Option<&str>, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "empty response body".to_string();
    }

    let content_type = content_type.unwrap_or("").to_ascii_lowercase();
    let looks_json = content_type.contains("json") || body.starts_with('{');
    let looks_html = content_type.contains("html") || body.starts_with('<');

    if looks_json && let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let field = ["message", "error", "detail", "title"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()));
        return match field {
            Some(message) => truncate(message),
            None => format!("JSON error body: {}", truncate(&value.to_string())),
        };
    }

    if looks_html {
        return match html_title(body) {
            Some(title) => format!("HTML error page: {}", truncate(title)),
            None => "HTML error page".to_string(),
        };
    }

    truncate(body)
}

fn html_title(body: &str) -> Option<&str> {
    let lower = body.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title")?;
    let title = body[start..end].trim();
    (!title.is_empty()).then_some(title)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_DETAIL_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    format!("{}...", cut)
}
