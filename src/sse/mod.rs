//! SSE (Server-Sent Events) stream handling
//!
//! The agent streams blank-line separated frames. Each frame is made of:
//! - `data: <json>` - payload fragments, joined with `\n`
//! - Lines starting with `:` - comments (heartbeats, stream markers)
//!
//! The joined payload is an envelope `{ "event": <type>, "data": <object> }`.
//!
//! # Module structure
//! - `splitter` - Byte-level frame splitting (FrameSplitter)
//! - `events` - Event type definitions (StreamEvent, SseLine, SseParseError)
//! - `payloads` - Internal payload deserialization structs
//! - `parser` - Decoding logic (SseDecoder, decode_frame, parse_sse_line)
//! - `encode` - Frame builders used by the relay

pub mod encode;
mod events;
mod parser;
mod payloads;
mod splitter;

pub use events::{SseLine, SseParseError, StreamEvent};
pub use parser::{decode_frame, parse_sse_line, parse_stream_event, SseDecoder};
pub use splitter::FrameSplitter;
