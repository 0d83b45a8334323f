//! Retrieval snapshot and enrichment event parsers

use serde_json::Value;

use super::payload;
use crate::sse::events::{SseParseError, StreamEvent};
use crate::sse::payloads::{ContentMetadatasPayload, RetrievalsPayload};

pub(super) fn parse_retrievals_event(
    event_type: &str,
    data: Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: RetrievalsPayload = payload(event_type, data)?;
    Ok(StreamEvent::Retrievals {
        contents: payload.contents,
    })
}

pub(super) fn parse_content_metadatas_event(
    event_type: &str,
    data: Value,
) -> Result<StreamEvent, SseParseError> {
    let payload: ContentMetadatasPayload = payload(event_type, data)?;
    Ok(StreamEvent::ContentMetadatas {
        content_metadatas: payload.content_metadatas,
    })
}
