use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::utils::url::UrlUtils;

/// Response captured from a single GET, redirects already followed
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as text, replacing invalid UTF-8 sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Outbound fetch capability used by discovery, candidate download and providers
///
/// Implementations must follow redirects and apply a timeout so every call
/// terminates. A non-success status is not an error at this layer; callers
/// decide what a 404 means for them.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` with the given request headers
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> AppResult<FetchedResponse>;
}

/// Default implementation of PageFetcher using reqwest
#[derive(Clone)]
pub struct StandardHttpClient {
    client: Client,
}

impl StandardHttpClient {
    /// Wrap an already configured reqwest client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for StandardHttpClient {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> AppResult<FetchedResponse> {
        let safe_url = UrlUtils::obfuscate_credentials(url);
        debug!("Fetching {}", safe_url);

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| AppError::fetch(&safe_url, UrlUtils::obfuscate_credentials(&e.to_string())))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&safe_url, format!("Failed to read response: {e}")))?;

        debug!(
            "Fetched {} bytes from {} (status {})",
            body.len(),
            UrlUtils::obfuscate_credentials(&final_url),
            status.as_u16()
        );

        Ok(FetchedResponse {
            url: final_url,
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            content_type,
            body,
        })
    }
}
