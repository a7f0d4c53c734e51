//! HTTP(S) document fetcher

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use super::{
    DocumentFetcher, FetchError, FetchOptions, FetchResult, check_size, describe_error_body,
    into_text,
};
use crate::import::Origin;

/// Fetches remote documents with a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
    max_document_bytes: u64,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and user agent
    pub fn new(options: &FetchOptions) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            timeout_secs: options.timeout.as_secs(),
            max_document_bytes: options.max_document_bytes,
        })
    }

    /// GET a URL and return its body as text
    pub async fn get(&self, url: &str) -> FetchResult<String> {
        debug!("Fetching {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            let detail = describe_error_body(content_type.as_deref(), &body);
            warn!("Fetching {} returned HTTP {}", url, status.as_u16());
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        if let Some(length) = response.content_length() {
            check_size(url, length, self.max_document_bytes)?;
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(url, e))? {
            append_chunk(&mut body, &chunk, url, self.max_document_bytes)?;
        }
        into_text(url, body)
    }

    fn classify(&self, url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_string(),
                seconds: self.timeout_secs,
            };
        }

        let message = error_chain(&error);
        let lower = message.to_ascii_lowercase();
        if lower.contains("dns error")
            || lower.contains("failed to lookup address")
            || lower.contains("name or service not known")
            || lower.contains("no such host")
        {
            FetchError::Dns {
                url: url.to_string(),
                message,
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message,
            }
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, origin: &Origin) -> FetchResult<String> {
        match origin {
            Origin::Url(url) => self.get(url.as_str()).await,
            other => Err(FetchError::Unsupported {
                location: other.to_string(),
                reason: "only http(s) URLs can be fetched over HTTP".to_string(),
            }),
        }
    }
}

/// Append one body chunk, failing as soon as the body outgrows `max` bytes
fn append_chunk(body: &mut Vec<u8>, chunk: &[u8], url: &str, max: u64) -> FetchResult<()> {
    check_size(url, (body.len() + chunk.len()) as u64, max)?;
    body.extend_from_slice(chunk);
    Ok(())
}

/// Flatten an error and its sources into one message
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
