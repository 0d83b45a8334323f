//! HTTP surface of the relay.
//!
//! - `POST /api/chat` - relay an agent answer as `text/event-stream`
//! - `POST /api/retrieval-info` - page-image lookup for a finished answer
//! - `GET /health` - liveness probe

mod handlers;
mod sse_response;

pub use handlers::{chat_handler, health_handler, retrieval_info_handler, ApiError};
pub use sse_response::SseResponse;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::ReqwestHttpClient;
use crate::config::RelayConfig;
use crate::error::ConfigError;
use crate::traits::HttpClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RelayServerState {
    pub config: Arc<RelayConfig>,
    /// Client used for every upstream call
    pub http: Arc<dyn HttpClient>,
}

impl RelayServerState {
    pub fn new(config: RelayConfig, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }
}

/// Build the router with CORS open for browser clients.
pub fn router(state: RelayServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/retrieval-info", post(retrieval_info_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the relay on the configured bind address with a reqwest client.
pub async fn start_server(
    config: RelayConfig,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
            key: "bind_addr".to_string(),
            message: e.to_string(),
        })?;
    start_server_on(addr, config, Arc::new(ReqwestHttpClient::new())).await
}

/// Start the relay on a specific address.
///
/// Binding port 0 picks an ephemeral port; the bound address is returned.
pub async fn start_server_on(
    addr: SocketAddr,
    config: RelayConfig,
    http: Arc<dyn HttpClient>,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    if config.credentials().is_err() {
        tracing::warn!("Agent credentials missing, requests will be answered with a configuration error");
    }

    let app = router(RelayServerState::new(config, http));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Relay listening on http://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Relay server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}
