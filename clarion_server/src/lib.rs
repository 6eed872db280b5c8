#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! HTTP API for the trending feed and on-demand fact checks.

mod error;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use clarion_config::ServerConfig;
use clarion_core::{TrendingChecker, VerdictAssembler};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use error::ServerError;

/// Application state shared across handlers
pub struct AppState {
    pub assembler: VerdictAssembler,
    pub trending: TrendingChecker,
    pub trending_country: String,
    pub trending_max_results: usize,
    /// Cancelled on shutdown; in-flight model calls derive from it.
    pub shutdown: CancellationToken,
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    routes::api_routes()
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Run the HTTP server until `state.shutdown` is cancelled.
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let shutdown = state.shutdown.clone();
    let app = router(Arc::new(state), &config.allowed_origins);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("HTTP server failed")?;
    info!("Server stopped");
    Ok(())
}
