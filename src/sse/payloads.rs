//! SSE payload deserialization structs
//!
//! Internal structs for the `data` object of each event type.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::{ContentMetadata, RetrievalContent};

/// Outer `{ "event": <type>, "data": <object> }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub data: Value,
    /// Older relays sent `{ "error": "..." }` with no event name
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MetadataPayload {
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RetrievalsPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contents: Vec<RetrievalContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DeltaPayload {
    #[serde(default)]
    pub delta: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CompletePayload {
    #[serde(default)]
    pub final_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ContentMetadatasPayload {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_metadatas: Vec<ContentMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
