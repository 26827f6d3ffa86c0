//! Request extractors
//!
//! Query parsing for the favicon endpoint is deliberately lenient: unknown
//! or malformed values fall back to defaults instead of rejecting the request.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

use crate::models::SelectionPreferences;

/// Query parameters of `GET /favicon/{domain}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaviconQuery {
    /// `larger=true`
    pub larger: bool,
    /// `minSize=<n>`, leading digits only
    pub min_size: u32,
    /// `autoPadding=true`
    pub auto_padding: bool,
}

impl FaviconQuery {
    /// Parse a raw query string; the first occurrence of each key wins
    pub fn parse(query: &str) -> Self {
        let mut larger = None;
        let mut min_size = None;
        let mut auto_padding = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "larger" => {
                    larger.get_or_insert_with(|| value == "true");
                }
                "minSize" => {
                    min_size.get_or_insert_with(|| leading_integer(&value));
                }
                "autoPadding" => {
                    auto_padding.get_or_insert_with(|| value == "true");
                }
                _ => {}
            }
        }

        Self {
            larger: larger.unwrap_or(false),
            min_size: min_size.unwrap_or(0),
            auto_padding: auto_padding.unwrap_or(false),
        }
    }

    pub fn preferences(&self) -> SelectionPreferences {
        SelectionPreferences {
            prefer_largest: self.larger,
            minimum_width: self.min_size,
        }
    }
}

/// Leading decimal digits of `value`, 0 when there are none or the value is negative
fn leading_integer(value: &str) -> u32 {
    let trimmed = value.trim_start();
    let digits: String = trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits
        .parse::<u64>()
        .map_or(0, |n| n.min(u32::MAX as u64) as u32)
}

impl<S> FromRequestParts<S> for FaviconQuery
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::parse(parts.uri.query().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        assert_eq!(FaviconQuery::parse(""), FaviconQuery::default());
    }

    #[test]
    fn test_all_parameters() {
        let query = FaviconQuery::parse("larger=true&minSize=64&autoPadding=true");
        assert!(query.larger);
        assert!(query.auto_padding);
        assert_eq!(query.min_size, 64);
        assert_eq!(
            query.preferences(),
            SelectionPreferences {
                prefer_largest: true,
                minimum_width: 64
            }
        );
    }

    #[rstest]
    #[case("larger=TRUE", false)]
    #[case("larger=1", false)]
    #[case("larger=", false)]
    #[case("larger", false)]
    #[case("larger=true", true)]
    #[case("larger=true&larger=false", true)]
    fn test_boolean_is_exact_true(#[case] query: &str, #[case] expected: bool) {
        assert_eq!(FaviconQuery::parse(query).larger, expected);
    }

    #[rstest]
    #[case("minSize=32px", 32)]
    #[case("minSize=abc", 0)]
    #[case("minSize=-5", 0)]
    #[case("minSize=%2B48", 48)]
    #[case("minSize=99999999999", u32::MAX)]
    fn test_min_size_is_lenient(#[case] query: &str, #[case] expected: u32) {
        assert_eq!(FaviconQuery::parse(query).min_size, expected);
    }
}
