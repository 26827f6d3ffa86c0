use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Size hint used when a `<link>` carries no `sizes` attribute
pub const UNKNOWN_SIZE: &str = "unknown";

/// A single discovered icon reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconCandidate {
    /// Raw `sizes` attribute such as `32x32`, or [`UNKNOWN_SIZE`]
    pub sizes: String,
    /// Absolute URL or inline `data:image/...` payload
    pub href: String,
}

impl IconCandidate {
    pub fn new<S: Into<String>, H: Into<String>>(sizes: S, href: H) -> Self {
        Self {
            sizes: sizes.into(),
            href: href.into(),
        }
    }

    /// Width parsed from the leading integer of the size hint, 0 when absent
    ///
    /// `"32x32"` is 32, `"16x16 32x32"` is 16, `"any"` and `"unknown"` are 0.
    pub fn width(&self) -> u32 {
        let head = self.sizes.split('x').next().unwrap_or_default().trim_start();
        let digits: &str = head
            .find(|c: char| !c.is_ascii_digit())
            .map_or(head, |end| &head[..end]);
        digits.parse::<u64>().map_or(0, |w| w.min(u32::MAX as u64) as u32)
    }

    /// Whether the reference is an inline `data:` payload
    pub fn is_inline(&self) -> bool {
        self.href.starts_with("data:image")
    }
}

/// Outcome of one fetch-and-extract attempt against a single URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Final URL after redirects
    pub url: String,
    pub host: String,
    pub status: u16,
    pub status_text: String,
    pub icons: Vec<IconCandidate>,
}

impl DiscoveryResult {
    /// Empty result reported when the page could not be fetched at all
    pub fn failed(url: &str, host: &str) -> Self {
        Self {
            url: url.to_string(),
            host: host.to_string(),
            status: 500,
            status_text: "Failed to fetch icons".to_string(),
            icons: Vec::new(),
        }
    }

    pub fn has_icons(&self) -> bool {
        !self.icons.is_empty()
    }
}

/// Caller preferences that drive icon selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPreferences {
    pub prefer_largest: bool,
    pub minimum_width: u32,
}

/// Raw image bytes plus the mime type they were served with
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Fixed-canvas image produced by the compositor
#[derive(Debug, Clone)]
pub struct RenderedIcon {
    pub payload: Vec<u8>,
    pub mime_type: String,
    /// Inset applied on every side, either 0 or 10 canvas units
    pub padding: u32,
}

/// Pre-rendered icon returned unmodified by an external provider
#[derive(Debug, Clone)]
pub struct ProviderIcon {
    pub source: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Generated letter glyph served as the terminal negative result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderGlyph {
    pub letter: String,
    pub svg: String,
}

/// Final result of resolving an icon for one request
#[derive(Debug, Clone)]
pub enum IconOutcome {
    /// A discovered candidate composed into the fixed canvas
    Rendered { icon: RenderedIcon, elapsed: Duration },
    /// A provider answer passed through byte-for-byte
    Provider(ProviderIcon),
    /// Nothing usable was found, or the domain was rejected
    Placeholder(PlaceholderGlyph),
}
