//! Client for the hosted agent's query API.
//!
//! Two calls are used: a streaming query that returns the answer as an event
//! stream, and a retrieval-info lookup that returns page images for the
//! sources an answer cited.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::RelayConfig;
use crate::error::{ConfigError, NetworkError, RelayResult};
use crate::models::{AgentQueryRequest, ChatMessage, ContentMetadata, RetrievalInfoResponse};
use crate::traits::{bearer_json_headers, ByteStream, HttpClient, HttpError, MetadataLookup};

/// Agent API client bound to one agent and one API key.
#[derive(Clone)]
pub struct AgentClient {
    http: Arc<dyn HttpClient>,
    api_base: String,
    api_key: String,
    agent_id: String,
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("api_base", &self.api_base)
            .field("agent_id", &self.agent_id)
            .finish_non_exhaustive()
    }
}

impl AgentClient {
    pub fn new(
        http: Arc<dyn HttpClient>,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        agent_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            agent_id: agent_id.into(),
        }
    }

    /// Build a client from configuration, failing if a credential is missing.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &RelayConfig) -> Result<Self, ConfigError> {
        let (api_key, agent_id) = config.credentials()?;
        Ok(Self::new(http, config.api_base.clone(), api_key, agent_id))
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// `POST` target of the streaming query.
    pub fn query_url(&self) -> String {
        format!(
            "{}/agents/{}/query?include_retrieval_content_text=true",
            self.api_base,
            urlencoding::encode(&self.agent_id)
        )
    }

    /// `GET` target of the retrieval-info lookup, one `content_ids` pair per id.
    pub fn retrieval_info_url(&self, message_id: &str, content_ids: &[String]) -> String {
        let query = content_ids
            .iter()
            .map(|id| format!("content_ids={}", urlencoding::encode(id)))
            .collect::<Vec<_>>()
            .join("&");
        format!(
            "{}/agents/{}/query/{}/retrieval/info?{}",
            self.api_base,
            urlencoding::encode(&self.agent_id),
            urlencoding::encode(message_id),
            query
        )
    }

    /// Open the answer stream for a conversation.
    ///
    /// A non-success status comes back as [`HttpError::ServerError`] with the
    /// response body, before any stream bytes.
    pub async fn query_stream(&self, messages: &[ChatMessage]) -> Result<ByteStream, HttpError> {
        let body = serde_json::to_string(&AgentQueryRequest::streaming(messages.to_vec()))
            .map_err(|e| HttpError::Other(e.to_string()))?;
        let url = self.query_url();
        tracing::debug!(agent_id = %self.agent_id, messages = messages.len(), "Opening agent query stream");
        self.http
            .post_stream(&url, &body, &bearer_json_headers(&self.api_key))
            .await
    }
}

#[async_trait]
impl MetadataLookup for AgentClient {
    async fn retrieval_info(
        &self,
        message_id: &str,
        content_ids: &[String],
    ) -> RelayResult<Vec<ContentMetadata>> {
        let url = self.retrieval_info_url(message_id, content_ids);
        let response = self
            .http
            .get(&url, &bearer_json_headers(&self.api_key))
            .await?;

        if !response.is_success() {
            return Err(NetworkError::HttpStatus {
                status: response.status,
                message: response.text_lossy(),
            }
            .into());
        }

        let info: RetrievalInfoResponse = response.json()?;
        Ok(info.content_metadatas)
    }
}
