//! HTTP client for the relay's own routes.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{NetworkError, RelayError, RelayResult, StreamError};
use crate::models::{
    ChatMessage, ChatRequest, ContentMetadata, ErrorBody, RetrievalInfoRequest,
    RetrievalInfoResponse,
};
use crate::sse::{SseDecoder, StreamEvent};
use crate::traits::{json_headers, HttpClient, HttpError, MetadataLookup, Response};

/// Decoded events of one chat turn.
///
/// Ends after the last complete frame. A transport failure is yielded once as
/// an error item and ends the stream.
pub type EventStream = Pin<Box<dyn Stream<Item = RelayResult<StreamEvent>> + Send>>;

/// Client for `POST /api/chat` and `POST /api/retrieval-info`.
#[derive(Clone)]
pub struct ChatClient {
    http: Arc<dyn HttpClient>,
    base_url: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    pub fn retrieval_info_url(&self) -> String {
        format!("{}/api/retrieval-info", self.base_url)
    }

    /// Send the conversation history and stream the answer events.
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> RelayResult<EventStream> {
        let body = serde_json::to_string(&ChatRequest {
            messages: messages.to_vec(),
        })?;

        let bytes = self
            .http
            .post_stream(&self.chat_url(), &body, &json_headers())
            .await
            .map_err(route_error)?;

        tracing::debug!(messages = messages.len(), "Chat stream opened");

        let events = stream::unfold(
            (bytes, SseDecoder::new(), VecDeque::new(), false),
            |(mut bytes, mut decoder, mut queue, done)| async move {
                loop {
                    if let Some(event) = queue.pop_front() {
                        return Some((Ok(event), (bytes, decoder, queue, done)));
                    }
                    if done {
                        return None;
                    }
                    match bytes.next().await {
                        Some(Ok(chunk)) => queue.extend(decoder.feed(&chunk)),
                        Some(Err(e)) => {
                            let err = RelayError::from(StreamError::ConnectionLost {
                                message: e.to_string(),
                            });
                            return Some((Err(err), (bytes, decoder, queue, true)));
                        }
                        None => {
                            if decoder.skipped() > 0 {
                                tracing::debug!(
                                    skipped = decoder.skipped(),
                                    "Chat stream closed with skipped frames"
                                );
                            }
                            return None;
                        }
                    }
                }
            },
        );

        Ok(Box::pin(events))
    }
}

#[async_trait]
impl MetadataLookup for ChatClient {
    async fn retrieval_info(
        &self,
        message_id: &str,
        content_ids: &[String],
    ) -> RelayResult<Vec<ContentMetadata>> {
        let body = serde_json::to_string(&RetrievalInfoRequest::new(
            message_id,
            content_ids.to_vec(),
        ))?;
        let response = self
            .http
            .post(&self.retrieval_info_url(), &body, &json_headers())
            .await?;

        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: error_message(&response),
            }
            .into());
        }

        let info: RetrievalInfoResponse = response.json()?;
        Ok(info.content_metadatas)
    }
}

/// Prefer the `{"error": ...}` text of a relay error answer.
fn error_message(response: &Response) -> String {
    match response.json::<ErrorBody>() {
        Ok(body) => body.error,
        Err(_) => response.text_lossy(),
    }
}

fn route_error(err: HttpError) -> RelayError {
    match err {
        HttpError::ServerError { status, message } => {
            let message = serde_json::from_str::<ErrorBody>(&message)
                .map(|body| body.error)
                .unwrap_or(message);
            NetworkError::HttpStatus { status, message }.into()
        }
        other => other.into(),
    }
}
