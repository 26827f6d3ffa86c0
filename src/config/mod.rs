use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

/// Environment variable prefix for configuration overrides (`FAVICON_PROXY_WEB__PORT=9000`)
pub const ENV_PREFIX: &str = "FAVICON_PROXY_";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub transparency_cache: TransparencyCacheConfig,
    #[serde(default)]
    pub response: ResponseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Outbound HTTP client settings shared by every fetch the service makes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total time allowed for a single fetch, redirects included
    #[serde(default = "default_request_timeout", with = "duration")]
    pub request_timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Overrides the `favicon-proxy/<version>` user agent when the caller sends none
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Host prefixes removed once before validation
    #[serde(default = "default_strip_prefixes")]
    pub strip_prefixes: Vec<String>,
    /// Two-label public suffixes that keep three labels in the main domain
    #[serde(default = "default_compound_suffixes")]
    pub compound_suffixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Ordered URL templates queried when discovery finds nothing
    #[serde(default = "default_fallback_providers")]
    pub fallback: Vec<String>,
    /// URL template used by the `larger` fast path
    #[serde(default = "default_larger_provider")]
    pub larger: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransparencyCacheConfig {
    #[serde(default = "default_transparency_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_transparency_cache_ttl", with = "duration")]
    pub ttl: Duration,
    /// Number of hex characters of the content digest used as cache key
    #[serde(default = "default_fingerprint_length")]
    pub fingerprint_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// `Cache-Control: max-age` in seconds for every image response
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u64,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// HTTP defaults
fn default_request_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
}

fn default_max_redirects() -> usize {
    DEFAULT_MAX_REDIRECTS
}

// Discovery defaults
fn default_strip_prefixes() -> Vec<String> {
    DEFAULT_STRIP_PREFIXES.iter().map(|s| s.to_string()).collect()
}

fn default_compound_suffixes() -> Vec<String> {
    DEFAULT_COMPOUND_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

// Provider defaults
fn default_fallback_providers() -> Vec<String> {
    DEFAULT_FALLBACK_PROVIDERS.iter().map(|s| s.to_string()).collect()
}

fn default_larger_provider() -> String {
    DEFAULT_LARGER_PROVIDER.to_string()
}

// Cache defaults
fn default_transparency_cache_capacity() -> usize {
    DEFAULT_TRANSPARENCY_CACHE_CAPACITY
}

fn default_transparency_cache_ttl() -> Duration {
    Duration::from_secs(DEFAULT_TRANSPARENCY_CACHE_TTL_SECS)
}

fn default_fingerprint_length() -> usize {
    DEFAULT_FINGERPRINT_LENGTH
}

fn default_cache_max_age() -> u64 {
    DEFAULT_CACHE_MAX_AGE
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: None,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            strip_prefixes: default_strip_prefixes(),
            compound_suffixes: default_compound_suffixes(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback_providers(),
            larger: default_larger_provider(),
        }
    }
}

impl Default for TransparencyCacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_transparency_cache_capacity(),
            ttl: default_transparency_cache_ttl(),
            fingerprint_length: default_fingerprint_length(),
        }
    }
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            cache_max_age: default_cache_max_age(),
        }
    }
}

impl TransparencyCacheConfig {
    /// Reject values that would make the cache unusable
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("transparency_cache.capacity must be greater than 0".to_string());
        }
        if self.fingerprint_length == 0 || self.fingerprint_length > 64 {
            return Err(format!(
                "transparency_cache.fingerprint_length must be between 1 and 64, got {}",
                self.fingerprint_length
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration layered as defaults, then the TOML file, then environment
    ///
    /// A missing file is created with the default configuration so operators
    /// have something to edit.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if !std::path::Path::new(config_file).exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
        }

        let config: Config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.transparency_cache
            .validate()
            .map_err(|message| anyhow::anyhow!(message))?;
        if self.http.max_redirects == 0 {
            anyhow::bail!("http.max_redirects must be greater than 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.transparency_cache.capacity, 5000);
        assert_eq!(config.transparency_cache.ttl, Duration::from_secs(86400));
        assert_eq!(config.response.cache_max_age, 86400);
        assert_eq!(config.providers.fallback.len(), 2);
        assert!(config.providers.fallback[0].contains("google.com"));
        assert_eq!(config.discovery.strip_prefixes, vec!["app.", "web."]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.host, "0.0.0.0");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[web]
port = 9090

[http]
request_timeout = "3s"

[transparency_cache]
ttl = "1h"
"#,
        )
        .unwrap();

        let config = Config::load_from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.web.port, 9090);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.http.request_timeout, Duration::from_secs(3));
        assert_eq!(config.transparency_cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.transparency_cache.capacity, 5000);
    }

    #[test]
    fn test_invalid_cache_config_rejected() {
        let mut config = Config::default();
        config.transparency_cache.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.transparency_cache.fingerprint_length = 65;
        assert!(config.validate().is_err());
    }
}
