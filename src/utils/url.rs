//! URL utilities for consistent URL handling
//!
//! This module provides the URL manipulation used by icon discovery:
//! building page URLs for a scheme/host pair, turning `<link href>` values
//! into absolute references, and expanding provider URL templates.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Query parameters whose values are masked in logged URLs
fn sensitive_query_param() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([?&](?:username|password|user|pass|pwd|token)=)[^&]*")
            .expect("sensitive parameter pattern is valid")
    })
}

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Build the root page URL for a scheme and host
    ///
    /// # Examples
    ///
    /// ```rust
    /// use favicon_proxy::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::page_url("https", "example.com"), "https://example.com/");
    /// ```
    pub fn page_url(scheme: &str, host: &str) -> String {
        format!("{scheme}://{host}/")
    }

    /// Scheme and authority (`host[:port]`) of a URL, used as the base for relative references
    pub fn origin_parts(url: &Url) -> (String, String) {
        let host = url.host_str().unwrap_or_default();
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        (url.scheme().to_string(), authority)
    }

    /// Turn an icon reference found in markup into an absolute reference
    ///
    /// Rules, in order:
    /// - references starting with `http` or `data:image` are kept as-is
    /// - scheme-relative references (`//cdn.example.com/icon.png`) get the page scheme
    /// - anything else is a path on the page's scheme and host, forced to start with `/`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use favicon_proxy::utils::url::UrlUtils;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://example.com/blog/post").unwrap();
    /// assert_eq!(
    ///     UrlUtils::resolve_reference(&base, "favicon.ico"),
    ///     "https://example.com/favicon.ico"
    /// );
    /// ```
    pub fn resolve_reference(base: &Url, href: &str) -> String {
        if href.starts_with("//") {
            return format!("{}:{}", base.scheme(), href);
        }
        if href.starts_with("http") || href.starts_with("data:image") {
            return href.to_string();
        }

        let (scheme, authority) = Self::origin_parts(base);
        if href.starts_with('/') {
            format!("{scheme}://{authority}{href}")
        } else {
            format!("{scheme}://{authority}/{href}")
        }
    }

    /// Substitute `{domain}` in a provider URL template
    pub fn expand_template(template: &str, domain: &str) -> String {
        template.replace("{domain}", domain)
    }

    /// Extract the domain from a URL
    pub fn extract_domain(url: &str) -> Option<String> {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    /// Obfuscate sensitive information in URLs for safe logging
    ///
    /// This function masks usernames and passwords in URLs to prevent
    /// sensitive credentials from appearing in logs.
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        sensitive_query_param()
            .replace_all(&obfuscated, "${1}****")
            .into_owned()
    }
}
