//! Health check HTTP handlers

use axum::{extract::State, response::Response};

use crate::web::{
    AppState,
    responses::{HealthResponse, ok},
};

/// Health check endpoint
///
/// Reports version, uptime and the current size of the transparency cache.
pub async fn health_check(State(state): State<AppState>) -> Response {
    let uptime = chrono::Utc::now() - state.start_time;

    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds(),
        transparency_cache_entries: state.favicon_service.transparency_cache().len(),
    })
}

/// Liveness probe: if we can respond, we're alive
pub async fn liveness_check() -> Response {
    ok(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now()
    }))
}
