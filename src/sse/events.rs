//! SSE event type definitions
//!
//! Contains the typed stream events, the per-line classification, and the
//! decode error reported for frames that are skipped.

use serde_json::Value;

use crate::models::{ContentMetadata, RetrievalContent};

/// Represents a parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Payload fragment (`data:` prefix and one leading space removed)
    Data(String),
    /// Comment line (starts with ':')
    Comment(String),
    /// Any other field (`event:`, `id:`, `retry:`...), unused by this protocol
    Field(String),
    /// Empty line
    Empty,
}

/// Typed events carried inside the `{ "event", "data" }` envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Identifiers for the answer being generated
    Metadata {
        message_id: Option<String>,
        conversation_id: Option<String>,
    },
    /// Full replacement snapshot of the retrieved sources
    Retrievals { contents: Vec<RetrievalContent> },
    /// Next fragment of answer text
    MessageDelta { delta: String },
    /// Authoritative final answer text
    MessageComplete { final_message: Option<String> },
    /// Attribution data, forwarded but not interpreted
    Attributions { data: Value },
    /// Enrichment metadata for the retrievals
    ContentMetadatas {
        content_metadatas: Vec<ContentMetadata>,
    },
    End,
    Error { message: Option<String> },
    /// Event type this crate does not interpret
    Unknown { event: String },
}

impl StreamEvent {
    /// Get the wire name of this event type
    pub fn event_type_name(&self) -> &str {
        match self {
            StreamEvent::Metadata { .. } => "metadata",
            StreamEvent::Retrievals { .. } => "retrievals",
            StreamEvent::MessageDelta { .. } => "message_delta",
            StreamEvent::MessageComplete { .. } => "message_complete",
            StreamEvent::Attributions { .. } => "attributions",
            StreamEvent::ContentMetadatas { .. } => "content_metadatas",
            StreamEvent::End => "end",
            StreamEvent::Error { .. } => "error",
            StreamEvent::Unknown { event } => event,
        }
    }
}

/// Why a frame produced no event.
#[derive(Debug, Clone, PartialEq)]
pub enum SseParseError {
    /// Joined data lines are not valid JSON
    InvalidJson { source: String },
    /// Envelope has neither an `event` name nor a legacy `error` field
    MissingEventType,
    /// Event data does not match the shape of its type
    InvalidPayload { event_type: String, source: String },
}

impl std::fmt::Display for SseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SseParseError::InvalidJson { source } => write!(f, "Invalid JSON in frame: {}", source),
            SseParseError::MissingEventType => write!(f, "Envelope has no event type"),
            SseParseError::InvalidPayload { event_type, source } => {
                write!(f, "Invalid payload for event '{}': {}", event_type, source)
            }
        }
    }
}

impl std::error::Error for SseParseError {}
