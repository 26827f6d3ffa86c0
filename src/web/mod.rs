//! Web layer module
//!
//! Thin axum handlers on top of [`FaviconService`]. The router is built from
//! an [`AppState`] so tests can drive it with an injected fetcher.

use anyhow::Result;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::{config::Config, services::FaviconService};

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod responses;

pub use extractors::FaviconQuery;
pub use responses::{ApiResponse, HealthResponse, handle_error};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub favicon_service: FaviconService,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: Config, favicon_service: FaviconService) -> Self {
        Self {
            config,
            favicon_service,
            start_time: chrono::Utc::now(),
        }
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        Ok(Self {
            app: Self::create_router(state),
            addr,
        })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/favicon/{domain}", get(handlers::favicon::get_favicon))
            .route("/health", get(handlers::health::health_check))
            .route("/live", get(handlers::health::liveness_check))
            // Middleware (applied in reverse order)
            .layer(CorsLayer::permissive())
            .layer(axum::middleware::from_fn(
                middleware::request_logging_middleware,
            ))
            .with_state(state)
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until SIGINT or SIGTERM, then drain in-flight requests
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Favicon proxy listening on http://{}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down gracefully");
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT, shutting down gracefully");
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to install signal handlers: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down gracefully"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    }
}
