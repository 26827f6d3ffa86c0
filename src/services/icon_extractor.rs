//! Markup icon extraction
//!
//! Finds `<link rel="...icon...">` declarations in a fetched page and turns
//! their `href` into absolute references. Extraction is purely textual; the
//! page is never parsed as a DOM and references are not checked for reachability.

use regex::Regex;
use reqwest::header::HeaderMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};
use url::Url;

use crate::models::{DiscoveryResult, IconCandidate, UNKNOWN_SIZE};
use crate::utils::PageFetcher;
use crate::utils::url::UrlUtils;

fn link_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<link\b[^>]*\brel\s*=\s*['"][^'"]*icon[^'"]*['"][^>]*>"#)
            .expect("link tag pattern is valid")
    })
}

fn href_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|[\s<])href\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("href pattern is valid")
    })
}

fn sizes_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)(?:^|[\s<])sizes\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("sizes pattern is valid")
    })
}

/// Value of the first quoted attribute matched by `pattern` in `tag`
fn attribute_value(pattern: &Regex, tag: &str) -> Option<String> {
    pattern.captures(tag).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// Extract every icon declaration from `body`, in document order
///
/// Declarations without an `href` are skipped. Missing `sizes` become
/// [`UNKNOWN_SIZE`]. Duplicates are kept.
pub fn extract_icons(base: &Url, body: &str) -> Vec<IconCandidate> {
    link_tag_pattern()
        .find_iter(body)
        .filter_map(|tag| {
            let tag = tag.as_str();
            let href = attribute_value(href_pattern(), tag).filter(|h| !h.is_empty())?;
            let href = href.replace("&amp;", "&");
            let sizes = attribute_value(sizes_pattern(), tag)
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SIZE.to_string());

            Some(IconCandidate::new(
                sizes,
                UrlUtils::resolve_reference(base, &href),
            ))
        })
        .collect()
}

/// Fetches pages and extracts their icon candidates
#[derive(Clone)]
pub struct IconExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl IconExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch `url` and extract icon candidates from the final (post-redirect) page
    ///
    /// Never fails: a network or URL error is reported as an empty result with status 500.
    pub async fn discover(&self, url: &str, headers: &HeaderMap) -> DiscoveryResult {
        let requested_host = UrlUtils::extract_domain(url).unwrap_or_default();

        let response = match self.fetcher.fetch(url, headers).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error fetching favicons from {}: {}", url, e);
                return DiscoveryResult::failed(url, &requested_host);
            }
        };

        let base = match Url::parse(&response.url) {
            Ok(base) => base,
            Err(e) => {
                warn!("Invalid response URL '{}' for {}: {}", response.url, url, e);
                return DiscoveryResult::failed(url, &requested_host);
            }
        };

        let icons = extract_icons(&base, &response.text());
        debug!(
            "Discovered {} icon candidates at {} (status {})",
            icons.len(),
            base,
            response.status
        );

        let (_, host) = UrlUtils::origin_parts(&base);
        DiscoveryResult {
            url: base.to_string(),
            host,
            status: response.status,
            status_text: response.status_text,
            icons,
        }
    }
}
