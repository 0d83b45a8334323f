//! Route handlers for the relay server.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::sse_response::SseResponse;
use super::RelayServerState;
use crate::agent::AgentClient;
use crate::error::{ErrorCategory, RelayError};
use crate::models::{ChatRequest, ErrorBody, RetrievalInfoRequest};
use crate::relay::UpstreamRelay;
use crate::traits::MetadataLookup;

/// JSON error answer: `{"error": "..."}` with a status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generic answer with the status for `category`.
    pub fn internal(category: ErrorCategory) -> Self {
        let status = StatusCode::from_u16(category.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::new(status, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match &err {
            RelayError::Config(config) => Self {
                message: config.to_string(),
                ..Self::internal(err.category())
            },
            RelayError::InvalidRequest { message } => Self::bad_request(message.clone()),
            _ => match err.upstream_status().and_then(|s| StatusCode::from_u16(s).ok()) {
                Some(status) => Self::new(status, format!("API Error: {}", err)),
                None => Self::internal(err.category()),
            },
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejecting request body: {}", e);
        ApiError::bad_request("Invalid JSON body")
    })
}

fn agent_client(state: &RelayServerState) -> Result<AgentClient, ApiError> {
    AgentClient::from_config(state.http.clone(), &state.config).map_err(|e| {
        tracing::error!(code = e.error_code(), "{}", e);
        ApiError::from(RelayError::from(e))
    })
}

/// `POST /api/chat`: relay the agent's answer as an event stream.
pub async fn chat_handler(
    State(state): State<RelayServerState>,
    body: Bytes,
) -> Result<SseResponse, ApiError> {
    let request: ChatRequest = parse_body(&body)?;
    if request.messages.is_empty() {
        return Err(ApiError::bad_request("No messages provided"));
    }

    let agent = agent_client(&state)?;
    tracing::info!(messages = request.messages.len(), "Chat request");

    let relay = UpstreamRelay::new(agent).with_heartbeat_interval(state.config.heartbeat_interval);
    let (rx, _handle) = relay.spawn(request.messages);
    Ok(SseResponse::new(rx))
}

/// `POST /api/retrieval-info`: fetch page images for an answer's sources.
pub async fn retrieval_info_handler(
    State(state): State<RelayServerState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: RetrievalInfoRequest = parse_body(&body)?;

    let message_id = request
        .message_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message ID is required"))?;
    let content_ids = request
        .content_ids
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| ApiError::bad_request("Content IDs are required"))?;

    let agent = agent_client(&state)?;
    match agent.retrieval_info(&message_id, &content_ids).await {
        Ok(metadatas) => Ok(Json(json!({ "contentMetadatas": metadatas })).into_response()),
        Err(e) => {
            tracing::warn!(
                message_id = %message_id,
                category = %e.category(),
                code = e.error_code(),
                "Retrieval info lookup failed: {}",
                e
            );
            Err(ApiError::from(e))
        }
    }
}

/// `GET /health`
pub async fn health_handler() -> &'static str {
    "ok"
}
