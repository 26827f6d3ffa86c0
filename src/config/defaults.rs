/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Outbound HTTP defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

// Discovery defaults
pub const DEFAULT_STRIP_PREFIXES: &[&str] = &["app.", "web."];
pub const DEFAULT_COMPOUND_SUFFIXES: &[&str] = &["gov.cn", "com.cn", "edu.cn"];

// External icon providers, `{domain}` is replaced with the normalized host
pub const DEFAULT_FALLBACK_PROVIDERS: &[&str] = &[
    "https://www.google.com/s2/favicons?domain={domain}",
    "https://icons.duckduckgo.com/ip3/{domain}.ico",
];
pub const DEFAULT_LARGER_PROVIDER: &str = "https://icons.duckduckgo.com/ip3/{domain}.ico";

// Transparency cache defaults
pub const DEFAULT_TRANSPARENCY_CACHE_CAPACITY: usize = 5000;
pub const DEFAULT_TRANSPARENCY_CACHE_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_FINGERPRINT_LENGTH: usize = 32;

// Response defaults
pub const DEFAULT_CACHE_MAX_AGE: u64 = 86400;
