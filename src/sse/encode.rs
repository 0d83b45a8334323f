//! Frame builders for the relay's own output.

use bytes::Bytes;
use serde_json::{json, Value};

use crate::models::ContentMetadata;

pub const KEEP_ALIVE: &str = "keep-alive";
pub const STREAM_START: &str = "stream-start";
pub const STREAM_END: &str = "stream-end";

/// Blank line closing a frame
pub const FRAME_END: &[u8] = b"\n\n";

/// `: <text>\n\n`
pub fn comment_frame(text: &str) -> Bytes {
    Bytes::from(format!(": {}\n\n", text))
}

/// `data: <json>\n\n`
pub fn data_frame(payload: &Value) -> Bytes {
    Bytes::from(format!("data: {}\n\n", payload))
}

/// Envelope frame for `event` with `data`.
pub fn event_frame(event: &str, data: Value) -> Bytes {
    data_frame(&json!({ "event": event, "data": data }))
}

pub fn error_event(message: &str) -> Bytes {
    event_frame("error", json!({ "message": message }))
}

pub fn content_metadatas_event(metadatas: &[ContentMetadata]) -> Bytes {
    event_frame("content_metadatas", json!({ "content_metadatas": metadatas }))
}
