//! Third-party icon providers and the placeholder glyph

use reqwest::header::HeaderMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use quick_xml::escape::escape;
use crate::config::ProvidersConfig;
use crate::models::{PlaceholderGlyph, ProviderIcon};
use crate::utils::PageFetcher;
use crate::utils::url::UrlUtils;

/// Content type assumed when a provider does not declare one
pub const DEFAULT_PROVIDER_CONTENT_TYPE: &str = "image/x-icon";

/// Queries external icon services in a fixed priority order
#[derive(Clone)]
pub struct ProviderFallback {
    fetcher: Arc<dyn PageFetcher>,
    providers: Vec<String>,
    larger: String,
}

impl ProviderFallback {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &ProvidersConfig) -> Self {
        Self {
            fetcher,
            providers: config.fallback.clone(),
            larger: config.larger.clone(),
        }
    }

    /// First provider answering with a success status, in configured order
    pub async fn first_available(&self, host: &str) -> Option<ProviderIcon> {
        for template in &self.providers {
            if let Some(icon) = self.query(template, host).await {
                return Some(icon);
            }
        }

        debug!("No icon provider answered for {}", host);
        None
    }

    /// Query only the prefer-larger provider
    pub async fn larger(&self, host: &str) -> Option<ProviderIcon> {
        self.query(&self.larger, host).await
    }

    async fn query(&self, template: &str, host: &str) -> Option<ProviderIcon> {
        let source = UrlUtils::expand_template(template, host);
        debug!("Trying icon provider {}", source);

        match self.fetcher.fetch(&source, &HeaderMap::new()).await {
            Ok(response) if response.is_success() => {
                info!("Icon provider {} answered for {}", source, host);
                Some(ProviderIcon {
                    content_type: response
                        .content_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_PROVIDER_CONTENT_TYPE.to_string()),
                    bytes: response.body.to_vec(),
                    source,
                })
            }
            Ok(response) => {
                debug!("Icon provider {} returned {}", source, response.status);
                None
            }
            Err(e) => {
                warn!("Error fetching icon from provider {}: {}", source, e);
                None
            }
        }
    }
}

/// Letter glyph for `requested_domain`, the raw value the caller asked for
///
/// Uses the uppercased first character, or an empty glyph for an empty domain.
pub fn placeholder_glyph(requested_domain: &str) -> PlaceholderGlyph {
    let letter: String = requested_domain
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();

    let svg = format!(
        concat!(
            r##"<svg width="100" height="100" xmlns="http://www.w3.org/2000/svg">"##,
            r##"<rect width="100%" height="100%" fill="#cccccc"/>"##,
            r##"<text x="50%" y="50%" font-size="48" text-anchor="middle" dominant-baseline="middle" fill="#000000">{}</text>"##,
            r##"</svg>"##
        ),
        escape(&letter)
    );

    PlaceholderGlyph { letter, svg }
}
