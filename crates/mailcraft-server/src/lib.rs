//! HTTP host for the Mailcraft pipeline
//!
//! A thin axum layer over [`mailcraft_core::Pipeline`]: one JSON chat route,
//! a health endpoint, permissive CORS for the browser-based chat UI, and
//! graceful shutdown. All request semantics live in the core; this crate only
//! translates between HTTP and the pipeline's request/response types.

use axum::extract::{DefaultBodyLimit, Json, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use mailcraft_core::core_types::{ChatRequest, ChatResponse};
use mailcraft_core::Pipeline;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

/// Configuration for the HTTP host.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable CORS (any origin; the chat UI is served elsewhere)
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".parse().expect("valid default address"),
            enable_cors: true,
            max_body_size: 4 * 1024 * 1024,
        }
    }
}

/// Builds the application router around a pipeline.
pub fn router(pipeline: Arc<Pipeline>, config: &ServerConfig) -> Router {
    let mut router = Router::new()
        .route("/api/ai-chat", post(ai_chat_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(pipeline);

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }
    router
}

async fn ai_chat_handler(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let response = pipeline.handle(request).await;
    let status = StatusCode::from_u16(response.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serves the router until shutdown is requested.
pub async fn serve(pipeline: Arc<Pipeline>, config: ServerConfig) -> anyhow::Result<()> {
    let app = router(pipeline, &config);
    let listener = TcpListener::bind(config.bind_addr).await?;
    log::info!("mailcraft server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolves when the process receives ctrl-c.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to install shutdown signal handler: {}", e);
        return;
    }
    log::info!("shutdown signal received");
}
