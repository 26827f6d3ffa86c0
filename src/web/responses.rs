//! Response builders
//!
//! Every image response carries the same `Cache-Control` header. Successful
//! compositions also report the pipeline duration in `X-Execution-Time`.

use axum::{
    Json,
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Duration;
use tracing::error;

use crate::errors::AppError;
use crate::models::{IconOutcome, PlaceholderGlyph, ProviderIcon, RenderedIcon};

/// Diagnostic header with the pipeline duration, e.g. `42ms`
pub const EXECUTION_TIME_HEADER: &str = "x-execution-time";

/// Body of the 500 response when the chosen icon cannot be delivered
pub const ICON_FAILURE_MESSAGE: &str = "Failed to fetch the icon";

/// Standard JSON envelope for the non-image endpoints
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Health document returned by `/health`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub transparency_cache_entries: usize,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

fn cache_control(max_age: u64) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={max_age}"))
        .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=86400"))
}

/// Content type header, falling back to `fallback` for values that are not valid header text
fn content_type(value: &str, fallback: &'static str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static(fallback))
}

/// Map a resolution outcome onto its HTTP response
pub fn outcome_response(outcome: IconOutcome, max_age: u64) -> Response {
    match outcome {
        IconOutcome::Rendered { icon, elapsed } => rendered_response(icon, elapsed, max_age),
        IconOutcome::Provider(icon) => provider_response(icon, max_age),
        IconOutcome::Placeholder(glyph) => placeholder_response(glyph, max_age),
    }
}

pub fn rendered_response(icon: RenderedIcon, elapsed: Duration, max_age: u64) -> Response {
    let mut response = Response::new(Body::from(icon.payload));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type(&icon.mime_type, "image/svg+xml"));
    headers.insert(header::CACHE_CONTROL, cache_control(max_age));
    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", elapsed.as_millis())) {
        headers.insert(EXECUTION_TIME_HEADER, value);
    }
    response
}

/// Provider bytes passed through unmodified
pub fn provider_response(icon: ProviderIcon, max_age: u64) -> Response {
    let mut response = Response::new(Body::from(icon.bytes));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type(&icon.content_type, "image/x-icon"));
    headers.insert(header::CACHE_CONTROL, cache_control(max_age));
    response
}

/// Placeholder glyph with a 404 status; a stable negative result, cached like a hit
pub fn placeholder_response(glyph: PlaceholderGlyph, max_age: u64) -> Response {
    let mut response = Response::new(Body::from(glyph.svg));
    *response.status_mut() = StatusCode::NOT_FOUND;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/svg+xml"));
    headers.insert(header::CACHE_CONTROL, cache_control(max_age));
    response
}

/// 500 plain-text response for a chosen icon that could not be delivered
pub fn handle_error(error: AppError) -> Response {
    error!("Error fetching the selected icon: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ICON_FAILURE_MESSAGE,
    )
        .into_response()
}
