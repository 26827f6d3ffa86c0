//! Shared fixtures for the HTTP integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_test::TestServer;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use favicon_proxy::{
    config::{Config, ProvidersConfig},
    errors::{AppError, AppResult},
    services::FaviconService,
    utils::{FetchedResponse, PageFetcher},
    web::{AppState, WebServer},
};

pub const LARGER_PROVIDER: &str = "https://large.test/{domain}";
pub const FALLBACK_PROVIDER: &str = "https://provider.test/{domain}";

#[derive(Clone)]
struct Route {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}

/// Scripted outbound HTTP: known URLs answer from the table, everything
/// else fails as if the connection was refused. Every call is recorded.
#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<(String, HeaderMap)>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, status: u16, content_type: Option<&str>, body: &[u8]) -> Self {
        self.routes.insert(
            url.to_string(),
            Route {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_vec(),
            },
        );
        self
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.route(url, 200, Some("text/html; charset=utf-8"), html.as_bytes())
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn headers_for(&self, url: &str) -> Option<HeaderMap> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(u, _)| u == url)
            .map(|(_, h)| h.clone())
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> AppResult<FetchedResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), headers.clone()));

        let route = self
            .routes
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "connection refused"))?;

        Ok(FetchedResponse {
            url: url.to_string(),
            status: route.status,
            status_text: String::new(),
            content_type: route.content_type,
            body: Bytes::from(route.body),
        })
    }
}

pub fn test_config() -> Config {
    Config {
        providers: ProvidersConfig {
            fallback: vec![FALLBACK_PROVIDER.to_string()],
            larger: LARGER_PROVIDER.to_string(),
        },
        ..Config::default()
    }
}

/// Router backed by `fetcher`, wrapped in an axum-test server
pub fn test_server(fetcher: FakeFetcher) -> (TestServer, Arc<FakeFetcher>) {
    let fetcher = Arc::new(fetcher);
    let config = test_config();
    let service = FaviconService::from_config(&config, fetcher.clone());
    let app = WebServer::create_router(AppState::new(config, service));
    (TestServer::new(app).unwrap(), fetcher)
}

/// 8x8 opaque PNG, optionally with one transparent corner pixel
pub fn png(transparent_corner: bool) -> Vec<u8> {
    let mut img = RgbaImage::from_pixel(8, 8, Rgba([30, 144, 255, 255]));
    if transparent_corner {
        img.put_pixel(7, 0, Rgba([0, 0, 0, 0]));
    }
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
