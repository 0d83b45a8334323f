//! Request and response bodies exchanged with the agent service and the relay.

use serde::{Deserialize, Serialize};

use super::message::MessageRole;
use super::retrieval::ContentMetadata;

/// One entry of the role/content history sent upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Body of the upstream agent query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentQueryRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl AgentQueryRequest {
    pub fn streaming(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            stream: true,
        }
    }
}

/// Body of `POST /api/retrieval-info`.
///
/// Accepts both the camelCase names browsers send and the snake_case names
/// of the enrichment contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalInfoRequest {
    #[serde(default, rename = "messageId", alias = "message_id")]
    pub message_id: Option<String>,
    #[serde(default, rename = "contentIds", alias = "content_ids")]
    pub content_ids: Option<Vec<String>>,
}

impl RetrievalInfoRequest {
    pub fn new(message_id: impl Into<String>, content_ids: Vec<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            content_ids: Some(content_ids),
        }
    }
}

/// Metadata lookup answer, from the agent service or from the relay route.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalInfoResponse {
    #[serde(
        default,
        rename = "contentMetadatas",
        alias = "content_metadatas",
        deserialize_with = "null_as_empty"
    )]
    pub content_metadatas: Vec<ContentMetadata>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ContentMetadata>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<ContentMetadata>>::deserialize(deserializer)?.unwrap_or_default())
}

/// JSON error body returned by the relay routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_query_request_serialization() {
        let req = AgentQueryRequest::streaming(vec![ChatMessage::user("hi")]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"messages": [{"role": "user", "content": "hi"}], "stream": true})
        );
    }

    #[test]
    fn test_chat_request_missing_messages_defaults_empty() {
        let req: ChatRequest = serde_json::from_str("{}").unwrap();
        assert!(req.messages.is_empty());
    }

    #[test]
    fn test_retrieval_info_request_accepts_both_casings() {
        let camel: RetrievalInfoRequest =
            serde_json::from_str(r#"{"messageId":"m1","contentIds":["a"]}"#).unwrap();
        let snake: RetrievalInfoRequest =
            serde_json::from_str(r#"{"message_id":"m1","content_ids":["a"]}"#).unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.message_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_retrieval_info_response_accepts_both_casings() {
        let upstream: RetrievalInfoResponse =
            serde_json::from_str(r#"{"content_metadatas":[{"content_id":"a","page_img":"x"}]}"#)
                .unwrap();
        let relay: RetrievalInfoResponse =
            serde_json::from_str(r#"{"contentMetadatas":[{"content_id":"a","page_img":"x"}]}"#)
                .unwrap();
        assert_eq!(upstream, relay);
        assert_eq!(upstream.content_metadatas[0].id(), Some("a"));
    }

    #[test]
    fn test_retrieval_info_response_null_list() {
        let resp: RetrievalInfoResponse =
            serde_json::from_str(r#"{"content_metadatas":null}"#).unwrap();
        assert!(resp.content_metadatas.is_empty());
    }
}
