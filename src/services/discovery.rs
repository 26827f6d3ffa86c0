//! Discovery waterfall
//!
//! Walks the (scheme, host) variants of a requested host in a fixed order and
//! stops at the first page that declares at least one icon. Attempts run one
//! after another; nothing is fetched speculatively and results from different
//! attempts are never merged.

use reqwest::header::{CONTENT_LENGTH, HOST, HeaderMap};
use tracing::debug;

use super::domain_resolver::DomainResolver;
use super::icon_extractor::IconExtractor;
use crate::models::DiscoveryResult;
use crate::utils::url::UrlUtils;

/// One planned fetch of the waterfall
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryAttempt {
    pub scheme: &'static str,
    pub host: String,
}

impl DiscoveryAttempt {
    fn new(scheme: &'static str, host: &str) -> Self {
        Self {
            scheme,
            host: host.to_string(),
        }
    }

    pub fn url(&self) -> String {
        UrlUtils::page_url(self.scheme, &self.host)
    }
}

/// Copy of the inbound headers suitable for outbound fetches
///
/// `host` and `content-length` describe the inbound request, not the target.
pub fn forwardable_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    headers
}

#[derive(Clone)]
pub struct DiscoveryWaterfall {
    extractor: IconExtractor,
    resolver: DomainResolver,
}

impl DiscoveryWaterfall {
    pub fn new(extractor: IconExtractor, resolver: DomainResolver) -> Self {
        Self {
            extractor,
            resolver,
        }
    }

    /// Ordered attempts for a validated, normalized host
    ///
    /// Secure before insecure, requested host before main domain. The main
    /// domain variants are left out when they equal the requested host.
    pub fn plan(&self, host: &str) -> Vec<DiscoveryAttempt> {
        let mut attempts = vec![
            DiscoveryAttempt::new("https", host),
            DiscoveryAttempt::new("http", host),
        ];

        let main_domain = self.resolver.main_domain(host);
        if main_domain != host {
            attempts.push(DiscoveryAttempt::new("https", &main_domain));
            attempts.push(DiscoveryAttempt::new("http", &main_domain));
        }

        attempts
    }

    /// Result of the first attempt that yields candidates, or `None` when all come back empty
    ///
    /// `headers` are sent as-is; callers strip inbound-only headers with [`forwardable_headers`].
    pub async fn run(&self, host: &str, headers: &HeaderMap) -> Option<DiscoveryResult> {
        for attempt in self.plan(host) {
            let url = attempt.url();
            let result = self.extractor.discover(&url, headers).await;
            debug!(
                "Discovery attempt {} returned {} candidates (status {})",
                url,
                result.icons.len(),
                result.status
            );

            if result.has_icons() {
                return Some(result);
            }
        }

        debug!("Discovery exhausted for {}", host);
        None
    }
}
