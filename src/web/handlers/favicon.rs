//! Favicon resolution endpoint

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, Uri},
    response::Response,
};
use tracing::debug;

use crate::services::placeholder_glyph;
use crate::web::{
    AppState,
    extractors::FaviconQuery,
    responses::{handle_error, outcome_response, placeholder_response},
};

const FAVICON_ROUTE_PREFIX: &str = "/favicon/";

/// `GET /favicon/{domain}`
///
/// Inbound headers are forwarded to the outbound fetches minus `host` and
/// `content-length`. Dropping this future (client disconnect) aborts any
/// fetch still in flight.
///
/// A segment that does not decode to UTF-8 can never be a valid host and is
/// answered with the placeholder directly.
pub async fn get_favicon(
    State(state): State<AppState>,
    uri: Uri,
    domain: Result<Path<String>, PathRejection>,
    query: FaviconQuery,
    headers: HeaderMap,
) -> Response {
    let max_age = state.config.response.cache_max_age;

    let domain = match domain {
        Ok(Path(domain)) => domain,
        Err(rejection) => {
            let raw = lossy_segment(&uri);
            debug!("Undecodable domain segment '{}': {}", raw, rejection);
            return placeholder_response(placeholder_glyph(&raw), max_age);
        }
    };

    debug!("Resolving favicon for '{}' with {:?}", domain, query);

    match state
        .favicon_service
        .resolve(&domain, query.preferences(), query.auto_padding, &headers)
        .await
    {
        Ok(outcome) => outcome_response(outcome, max_age),
        Err(e) => handle_error(e),
    }
}

fn lossy_segment(uri: &Uri) -> String {
    let path = uri.path();
    let segment = path.strip_prefix(FAVICON_ROUTE_PREFIX).unwrap_or(path);
    String::from_utf8_lossy(&urlencoding::decode_binary(segment.as_bytes())).into_owned()
}
