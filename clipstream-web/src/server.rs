//! Axum server wiring for the Clipstream API.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use clipstream_core::config::ClipstreamConfig;
use clipstream_core::pipeline::ClipPipeline;
use tower_http::cors::CorsLayer;

use crate::handlers::{api_clip, api_health, api_manifest, api_resolve};

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClipPipeline>,
    /// Client for playlist proxy fetches, separate from the pipeline's own
    /// upstream clients.
    pub http: reqwest::Client,
    pub request_timeout_secs: u64,
    pub server_started_at: Instant,
}

/// Builds the API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/resolve", get(api_resolve))
        .route("/api/manifest", get(api_manifest))
        .route("/api/clip", post(api_clip))
        .route("/api/health", get(api_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Runs the API server until the process exits.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be constructed from the given
/// configuration or the listener fails to bind.
pub async fn run_server(
    config: ClipstreamConfig,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let http = reqwest::Client::builder()
        .timeout(config.network.request_timeout)
        .user_agent(config.network.user_agent)
        .build()?;
    let request_timeout_secs = config.network.request_timeout.as_secs();

    let pipeline = Arc::new(ClipPipeline::new(config)?);

    let state = AppState {
        pipeline,
        http,
        request_timeout_secs,
        server_started_at: Instant::now(),
    };

    let app = build_router(state);

    let addr = format!("{host}:{port}");
    println!("Clipstream API server running on http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
