//! End-to-end icon resolution for one requested domain
//!
//! Ties the pipeline together: host normalization and validation, the
//! prefer-larger provider shortcut, the discovery waterfall, provider
//! fallback, candidate selection, download, transparency analysis and
//! composition.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::compositor::CanvasCompositor;
use super::discovery::{DiscoveryWaterfall, forwardable_headers};
use super::domain_resolver::DomainResolver;
use super::icon_extractor::IconExtractor;
use super::icon_selector::IconSelector;
use super::provider_fallback::{ProviderFallback, placeholder_glyph};
use super::transparency::{EdgeTransparencyAnalyzer, RasterImageDecoder, TransparencyCache};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{IconCandidate, IconOutcome, ImagePayload, SelectionPreferences};
use crate::utils::PageFetcher;

/// Mime type assumed for a downloaded candidate without a usable content type
pub const DEFAULT_CANDIDATE_MIME_TYPE: &str = "image/png";

#[derive(Clone)]
pub struct FaviconService {
    fetcher: Arc<dyn PageFetcher>,
    resolver: DomainResolver,
    waterfall: DiscoveryWaterfall,
    providers: ProviderFallback,
    analyzer: EdgeTransparencyAnalyzer,
}

impl FaviconService {
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        analyzer: EdgeTransparencyAnalyzer,
    ) -> Self {
        let resolver = DomainResolver::new(&config.discovery);
        Self {
            waterfall: DiscoveryWaterfall::new(IconExtractor::new(fetcher.clone()), resolver.clone()),
            providers: ProviderFallback::new(fetcher.clone(), &config.providers),
            resolver,
            analyzer,
            fetcher,
        }
    }

    /// Service with the default image decoder and a cache sized from configuration
    pub fn from_config(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Self {
        let cache = Arc::new(TransparencyCache::from_config(&config.transparency_cache));
        let analyzer = EdgeTransparencyAnalyzer::new(
            Arc::new(RasterImageDecoder),
            cache,
            config.transparency_cache.fingerprint_length,
        );
        Self::new(config, fetcher, analyzer)
    }

    pub fn transparency_cache(&self) -> &Arc<TransparencyCache> {
        self.analyzer.cache()
    }

    /// Resolve the icon for `requested_domain`
    ///
    /// Rejected domains and total exhaustion are reported as
    /// [`IconOutcome::Placeholder`]. An error means the chosen candidate
    /// could not be downloaded or decoded.
    pub async fn resolve(
        &self,
        requested_domain: &str,
        preferences: SelectionPreferences,
        auto_padding: bool,
        inbound_headers: &HeaderMap,
    ) -> AppResult<IconOutcome> {
        let started = Instant::now();

        let Some(host) = self
            .resolver
            .normalize(requested_domain)
            .filter(|host| DomainResolver::is_valid_host(host))
        else {
            debug!("Rejected malformed domain '{}'", requested_domain);
            return Ok(IconOutcome::Placeholder(placeholder_glyph(requested_domain)));
        };

        if preferences.prefer_largest {
            if let Some(icon) = self.providers.larger(&host).await {
                return Ok(IconOutcome::Provider(icon));
            }
        }

        let headers = forwardable_headers(inbound_headers);
        let Some(discovery) = self.waterfall.run(&host, &headers).await else {
            return Ok(match self.providers.first_available(&host).await {
                Some(icon) => IconOutcome::Provider(icon),
                None => {
                    info!("No icon found for {}, serving placeholder", host);
                    IconOutcome::Placeholder(placeholder_glyph(requested_domain))
                }
            });
        };

        let candidate = IconSelector::select(&discovery.icons, preferences)
            .ok_or_else(|| AppError::internal(format!("No candidate selectable for {host}")))?;
        debug!("Selected icon {} ({}) for {}", candidate.href, candidate.sizes, host);

        let payload = match self.load_candidate(candidate, &headers).await {
            Ok(payload) => payload,
            Err(AppError::Upstream { url, status }) => {
                warn!("Selected icon {} returned {}, serving placeholder", url, status);
                return Ok(IconOutcome::Placeholder(placeholder_glyph(requested_domain)));
            }
            Err(e) => return Err(e),
        };

        let add_padding = auto_padding && self.has_transparent_edges(&payload).await;
        let icon = CanvasCompositor::compose(&payload, add_padding);

        Ok(IconOutcome::Rendered {
            icon,
            elapsed: started.elapsed(),
        })
    }

    /// Bytes and mime type of the selected candidate
    async fn load_candidate(
        &self,
        candidate: &IconCandidate,
        headers: &HeaderMap,
    ) -> AppResult<ImagePayload> {
        if candidate.is_inline() {
            return decode_data_uri(&candidate.href);
        }

        let response = self.fetcher.fetch(&candidate.href, headers).await?;
        if !response.is_success() {
            return Err(AppError::Upstream {
                url: candidate.href.clone(),
                status: response.status,
            });
        }

        let mime_type = response
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CANDIDATE_MIME_TYPE)
            .to_string();

        Ok(ImagePayload {
            bytes: response.body.to_vec(),
            mime_type,
        })
    }

    /// Runs the decode off the async workers; a failed task counts as opaque
    async fn has_transparent_edges(&self, payload: &ImagePayload) -> bool {
        let analyzer = self.analyzer.clone();
        let bytes = payload.bytes.clone();
        tokio::task::spawn_blocking(move || analyzer.has_transparent_edges(&bytes))
            .await
            .unwrap_or_else(|e| {
                warn!("Transparency analysis task failed: {}", e);
                false
            })
    }
}

/// Decode an inline `data:image/...` reference
///
/// Supports `;base64` payloads (padding optional) and percent-encoded payloads.
pub fn decode_data_uri(href: &str) -> AppResult<ImagePayload> {
    let rest = href
        .strip_prefix("data:")
        .ok_or_else(|| AppError::decode("Not a data URI"))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| AppError::decode("Data URI has no payload"))?;

    let mut params = meta.split(';');
    let mime_type = params
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_CANDIDATE_MIME_TYPE)
        .to_string();
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD
            .decode(&compact)
            .or_else(|_| STANDARD_NO_PAD.decode(compact.trim_end_matches('=')))
            .map_err(|e| AppError::decode(format!("Invalid base64 in data URI: {e}")))?
    } else {
        urlencoding::decode_binary(data.as_bytes()).into_owned()
    };

    Ok(ImagePayload { bytes, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;
    use crate::utils::FetchedResponse;
    use async_trait::async_trait;
    use bytes::Bytes;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;

    #[derive(Clone)]
    struct Scripted {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    }

    /// Scripted responses by URL; anything else is a network failure
    #[derive(Default)]
    struct ScriptedFetcher {
        routes: HashMap<String, Scripted>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn route(mut self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
            self.routes.insert(
                url.to_string(),
                Scripted {
                    status,
                    content_type: content_type.map(str::to_string),
                    body: body.to_vec(),
                },
            );
            self
        }

        fn page(self, url: &str, html: &str) -> Self {
            self.route(url, 200, Some("text/html"), html.as_bytes())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _headers: &HeaderMap) -> AppResult<FetchedResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            let scripted = self
                .routes
                .get(url)
                .cloned()
                .ok_or_else(|| AppError::fetch(url, "connection refused"))?;
            Ok(FetchedResponse {
                url: url.to_string(),
                status: scripted.status,
                status_text: String::new(),
                content_type: scripted.content_type,
                body: Bytes::from(scripted.body),
            })
        }
    }

    fn config() -> Config {
        Config {
            providers: ProvidersConfig {
                fallback: vec!["https://provider.test/{domain}".to_string()],
                larger: "https://large.test/{domain}".to_string(),
            },
            ..Config::default()
        }
    }

    fn build_service(fetcher: ScriptedFetcher) -> (FaviconService, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(fetcher);
        (FaviconService::from_config(&config(), fetcher.clone()), fetcher)
    }

    fn transparent_edge_png() -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn no_prefs() -> SelectionPreferences {
        SelectionPreferences::default()
    }

    #[tokio::test]
    async fn test_malformed_domain_makes_no_network_calls() {
        let (service, fetcher) = build_service(ScriptedFetcher::default());
        let outcome = service
            .resolve("not_a_domain", SelectionPreferences { prefer_largest: true, minimum_width: 64 }, true, &HeaderMap::new())
            .await
            .unwrap();

        match outcome {
            IconOutcome::Placeholder(glyph) => assert_eq!(glyph.letter, "N"),
            other => panic!("expected placeholder, got {other:?}"),
        }
        assert!(fetcher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_larger_fast_path_skips_discovery() {
        let (service, fetcher) = build_service(
            ScriptedFetcher::default().route("https://large.test/example.com", 200, Some("image/png"), b"BIG"),
        );
        let outcome = service
            .resolve("example.com", SelectionPreferences { prefer_largest: true, minimum_width: 0 }, false, &HeaderMap::new())
            .await
            .unwrap();

        match outcome {
            IconOutcome::Provider(icon) => assert_eq!(icon.bytes, b"BIG"),
            other => panic!("expected provider icon, got {other:?}"),
        }
        assert_eq!(fetcher.calls(), vec!["https://large.test/example.com"]);
    }

    #[tokio::test]
    async fn test_discovered_icon_is_composed() {
        let (service, fetcher) = build_service(
            ScriptedFetcher::default()
                .page("https://example.com/", r#"<link rel="icon" sizes="32x32" href="/icon.png">"#)
                .route("https://example.com/icon.png", 200, Some("image/png; charset=binary"), &transparent_edge_png()),
        );
        let outcome = service
            .resolve("example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap();

        let IconOutcome::Rendered { icon, .. } = outcome else {
            panic!("expected rendered icon");
        };
        assert_eq!(icon.padding, 0);
        let svg = String::from_utf8(icon.payload).unwrap();
        assert!(svg.contains("href=\"data:image/png;base64,"));
        assert_eq!(fetcher.calls().len(), 2);
        assert!(service.transparency_cache().is_empty());
    }

    #[tokio::test]
    async fn test_auto_padding_on_transparent_edges() {
        let (service, _) = build_service(
            ScriptedFetcher::default()
                .page("https://example.com/", r#"<link rel="icon" href="/icon.png">"#)
                .route("https://example.com/icon.png", 200, None, &transparent_edge_png()),
        );
        let outcome = service
            .resolve("example.com", no_prefs(), true, &HeaderMap::new())
            .await
            .unwrap();

        let IconOutcome::Rendered { icon, .. } = outcome else {
            panic!("expected rendered icon");
        };
        assert_eq!(icon.padding, 10);
        assert_eq!(service.transparency_cache().len(), 1);
    }

    #[tokio::test]
    async fn test_inline_candidate_is_not_fetched() {
        let (service, fetcher) = build_service(ScriptedFetcher::default().page(
            "https://example.com/",
            r#"<link rel="icon" href="data:image/gif;base64,R0lGODlhAQABAAAAACw=">"#,
        ));
        let outcome = service
            .resolve("example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap();

        let IconOutcome::Rendered { icon, .. } = outcome else {
            panic!("expected rendered icon");
        };
        let svg = String::from_utf8(icon.payload).unwrap();
        assert!(svg.contains("href=\"data:image/gif;base64,R0lGODlhAQABAAAAACw=\""));
        assert_eq!(fetcher.calls(), vec!["https://example.com/"]);
    }

    #[tokio::test]
    async fn test_non_ok_candidate_serves_placeholder() {
        let (service, _) = build_service(
            ScriptedFetcher::default()
                .page("https://example.com/", r#"<link rel="icon" href="/gone.png">"#)
                .route("https://example.com/gone.png", 404, None, b""),
        );
        let outcome = service
            .resolve("Example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap();

        assert!(matches!(outcome, IconOutcome::Placeholder(ref g) if g.letter == "E"));
    }

    #[tokio::test]
    async fn test_unreachable_candidate_is_an_error() {
        let (service, _) = build_service(
            ScriptedFetcher::default().page("https://example.com/", r#"<link rel="icon" href="https://cdn.test/x.png">"#),
        );
        let err = service
            .resolve("example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_exhaustion_falls_back_to_provider_then_placeholder() {
        let (service, _) = build_service(
            ScriptedFetcher::default().route("https://provider.test/example.com", 200, None, b"ICO"),
        );
        let outcome = service
            .resolve("example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap();
        match outcome {
            IconOutcome::Provider(icon) => assert_eq!(icon.content_type, "image/x-icon"),
            other => panic!("expected provider icon, got {other:?}"),
        }

        let (service, fetcher) = build_service(ScriptedFetcher::default());
        let outcome = service
            .resolve("app.example.com", no_prefs(), false, &HeaderMap::new())
            .await
            .unwrap();
        assert!(matches!(outcome, IconOutcome::Placeholder(ref g) if g.letter == "A"));
        // two discovery attempts (no main-domain variant) plus one provider
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[test]
    fn test_decode_data_uri_variants() {
        let b64 = decode_data_uri("data:image/png;base64,iVBORw==").unwrap();
        assert_eq!(b64.mime_type, "image/png");
        assert_eq!(b64.bytes, vec![0x89, b'P', b'N', b'G']);

        let unpadded = decode_data_uri("data:image/png;base64,iVBORw").unwrap();
        assert_eq!(unpadded.bytes, b64.bytes);

        let svg = decode_data_uri("data:image/svg+xml,%3Csvg%2F%3E").unwrap();
        assert_eq!(svg.mime_type, "image/svg+xml");
        assert_eq!(svg.bytes, b"<svg/>");

        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
    }
}
