//! Answer text and lifecycle event parsers

use serde_json::Value;

use super::payload;
use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::{CompletePayload, DeltaPayload, ErrorPayload, MetadataPayload};

pub(super) fn parse_metadata_event(
    event_type: &str,
    data: Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: MetadataPayload = payload(event_type, data)?;
    Ok(StreamEvent::Metadata {
        message_id: payload.message_id.filter(|id| !id.is_empty()),
        conversation_id: payload.conversation_id.filter(|id| !id.is_empty()),
    })
}

pub(super) fn parse_delta_event(
    event_type: &str,
    data: Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: DeltaPayload = payload(event_type, data)?;
    Ok(StreamEvent::MessageDelta {
        delta: payload.delta.unwrap_or_default(),
    })
}

pub(super) fn parse_complete_event(
    event_type: &str,
    data: Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: CompletePayload = payload(event_type, data)?;
    Ok(StreamEvent::MessageComplete {
        final_message: payload.final_message,
    })
}

/// Parse error event. A bare string in `data` is taken as the message.
pub(super) fn parse_error_event(data: Value) -> Result<StreamEvent, SseParseError> {
    if let Value::String(message) = data {
        return Ok(StreamEvent::Error {
            message: Some(message),
        });
    }
    let payload: ErrorPayload = serde_json::from_value(data).unwrap_or_default();
    Ok(StreamEvent::Error {
        message: payload.message,
    })
}

/// Message text of a legacy `error` field: a string, or an object with `message`.
pub(super) fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("message").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
