//! Host normalization, validation and main-domain fallback
//!
//! All functions here are pure: no network access and no shared state.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::config::DiscoveryConfig;

fn host_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([a-z0-9-]+\.)+[a-z0-9]+$").expect("host pattern is valid")
    })
}

/// Resolves the hosts the discovery waterfall will try
#[derive(Debug, Clone)]
pub struct DomainResolver {
    strip_prefixes: Vec<String>,
    compound_suffixes: Vec<(String, String)>,
}

impl Default for DomainResolver {
    fn default() -> Self {
        Self::new(&DiscoveryConfig::default())
    }
}

impl DomainResolver {
    pub fn new(config: &DiscoveryConfig) -> Self {
        let compound_suffixes = config
            .compound_suffixes
            .iter()
            .filter_map(|suffix| {
                let (second, top) = suffix.trim_matches('.').split_once('.')?;
                Some((second.to_ascii_lowercase(), top.to_ascii_lowercase()))
            })
            .collect();

        Self {
            strip_prefixes: config
                .strip_prefixes
                .iter()
                .map(|p| p.to_ascii_lowercase())
                .collect(),
            compound_suffixes,
        }
    }

    /// Turn the raw requested domain into the ASCII host used for discovery
    ///
    /// The raw value is parsed as the host of an `http://` URL, which lowercases
    /// it and applies IDNA. One configured prefix (such as `app.`) is then removed.
    /// Returns `None` when no host can be parsed at all.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let parsed = Url::parse(&format!("http://{raw}")).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();

        let stripped = self
            .strip_prefixes
            .iter()
            .find(|prefix| host.len() > prefix.len() && host.starts_with(prefix.as_str()))
            .map(|prefix| host[prefix.len()..].to_string());

        Some(stripped.unwrap_or(host))
    }

    /// Whether `host` is a dotted sequence of lowercase alphanumeric/hyphen labels
    pub fn is_valid_host(host: &str) -> bool {
        host_pattern().is_match(host)
    }

    /// Registrable main domain of `host`
    ///
    /// `shop.example.com` gives `example.com`; `a.b.gov.cn` gives `b.gov.cn`
    /// because `gov.cn` is a compound suffix. Hosts with two labels or fewer
    /// are returned unchanged.
    pub fn main_domain(&self, host: &str) -> String {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() <= 2 {
            return host.to_string();
        }

        let second = parts[parts.len() - 2];
        let top = parts[parts.len() - 1];
        let keep = if self
            .compound_suffixes
            .iter()
            .any(|(s, t)| s == second && t == top)
        {
            3
        } else {
            2
        };

        parts[parts.len() - keep..].join(".")
    }
}
