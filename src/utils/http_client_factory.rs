//! HTTP Client Factory
//!
//! This module provides a centralized factory for creating HTTP clients
//! with the timeout and redirect policy from configuration, so every
//! outbound fetch in the service terminates.

use reqwest::redirect::Policy;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::{PageFetcher, StandardHttpClient};

/// Factory for creating HTTP clients with consistent limits
#[derive(Clone, Debug)]
pub struct HttpClientFactory {
    request_timeout: Duration,
    connect_timeout: Duration,
    max_redirects: usize,
    user_agent: String,
}

impl HttpClientFactory {
    /// Create a new HTTP client factory
    /// Falls back to a standard user agent format when none is configured
    pub fn new(config: &HttpConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            connect_timeout: config.connect_timeout,
            max_redirects: config.max_redirects,
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(Self::default_user_agent),
        }
    }

    pub fn default_user_agent() -> String {
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Build the reqwest-backed fetcher
    pub fn create_client(&self) -> AppResult<StandardHttpClient> {
        let client = reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .redirect(Policy::limited(self.max_redirects))
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        tracing::debug!(
            "Created HTTP client (timeout: {:?}, connect timeout: {:?}, max redirects: {})",
            self.request_timeout,
            self.connect_timeout,
            self.max_redirects
        );

        Ok(StandardHttpClient::new(client))
    }

    /// Build the fetcher as a shared trait object for services
    pub fn create_shared_fetcher(&self) -> AppResult<Arc<dyn PageFetcher>> {
        Ok(Arc::new(self.create_client()?))
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let factory = HttpClientFactory::new(&HttpConfig::default());
        assert!(factory.user_agent().starts_with("favicon-proxy/"));
    }

    #[test]
    fn test_configured_user_agent() {
        let config = HttpConfig {
            user_agent: Some("custom-agent/1.0".to_string()),
            ..HttpConfig::default()
        };
        let factory = HttpClientFactory::new(&config);
        assert_eq!(factory.user_agent(), "custom-agent/1.0");
    }

    #[test]
    fn test_create_client() {
        let factory = HttpClientFactory::new(&HttpConfig::default());
        assert!(factory.create_client().is_ok());
        assert!(factory.create_shared_fetcher().is_ok());
    }
}
