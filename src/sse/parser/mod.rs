//! SSE stream parsing logic
//!
//! Contains the stateful [`SseDecoder`] that turns raw chunks into typed
//! events, plus the line and frame level functions it is built from.

mod message;
mod retrieval;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::sse::events::{SseLine, SseParseError, StreamEvent};
use crate::sse::payloads::Envelope;
use crate::sse::splitter::FrameSplitter;

use message::{
    error_message, parse_complete_event, parse_delta_event, parse_error_event,
    parse_metadata_event,
};
use retrieval::{parse_content_metadatas_event, parse_retrievals_event};

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("data:") {
        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        return SseLine::Data(rest.to_string());
    }

    SseLine::Field(line.to_string())
}

/// Decode one complete frame.
///
/// Returns `Ok(None)` for frames that carry no event: comment-only frames
/// (heartbeats, stream markers) and frames without any `data:` line.
pub fn decode_frame(frame: &str) -> Result<Option<StreamEvent>, SseParseError> {
    let lines: Vec<SseLine> = frame.split('\n').map(parse_sse_line).collect();

    if lines.iter().all(|l| matches!(l, SseLine::Comment(_))) {
        return Ok(None);
    }

    let data: Vec<&str> = lines
        .iter()
        .filter_map(|l| match l {
            SseLine::Data(d) => Some(d.as_str()),
            _ => None,
        })
        .collect();
    if data.is_empty() {
        return Ok(None);
    }

    let envelope: Envelope =
        serde_json::from_str(&data.join("\n")).map_err(|e| SseParseError::InvalidJson {
            source: e.to_string(),
        })?;

    match (envelope.event, envelope.error) {
        (Some(event_type), _) => parse_stream_event(&event_type, envelope.data).map(Some),
        (None, Some(error)) => Ok(Some(StreamEvent::Error {
            message: error_message(&error),
        })),
        (None, None) => Err(SseParseError::MissingEventType),
    }
}

/// Parse the `data` object of an envelope into a typed event
pub fn parse_stream_event(event_type: &str, data: Value) -> Result<StreamEvent, SseParseError> {
    match event_type {
        "metadata" => parse_metadata_event(event_type, data),
        "retrievals" => parse_retrievals_event(event_type, data),
        "message_delta" => parse_delta_event(event_type, data),
        "message_complete" => parse_complete_event(event_type, data),
        "attributions" => Ok(StreamEvent::Attributions { data }),
        "content_metadatas" => parse_content_metadatas_event(event_type, data),
        "end" => Ok(StreamEvent::End),
        "error" => parse_error_event(data),
        // Unknown types are accepted and left to the consumer to ignore
        other => Ok(StreamEvent::Unknown {
            event: other.to_string(),
        }),
    }
}

/// Deserialize an event's `data`, treating a missing object as empty.
fn payload<T: DeserializeOwned + Default>(event_type: &str, data: Value) -> Result<T, SseParseError> {
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(|e| SseParseError::InvalidPayload {
        event_type: event_type.to_string(),
        source: e.to_string(),
    })
}

/// Stateful decoder: raw chunks in, typed events out.
///
/// Undecodable frames are skipped and logged at debug level; they never
/// interrupt the stream.
#[derive(Debug, Default)]
pub struct SseDecoder {
    splitter: FrameSplitter,
    skipped: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for frame in self.splitter.feed(chunk) {
            match decode_frame(&frame) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(e) => {
                    self.skipped += 1;
                    tracing::debug!(error = %e, "Skipping undecodable SSE frame");
                }
            }
        }
        events
    }

    /// Number of frames skipped so far because they failed to decode
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Bytes after the last complete frame are still held back.
    pub fn has_partial_frame(&self) -> bool {
        !self.splitter.buffered().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RetrievalContent;

    #[test]
    fn test_parse_data_line_strips_one_space() {
        assert_eq!(parse_sse_line("data: x"), SseLine::Data("x".to_string()));
        assert_eq!(parse_sse_line("data:x"), SseLine::Data("x".to_string()));
        assert_eq!(parse_sse_line("data:  x"), SseLine::Data(" x".to_string()));
    }

    #[test]
    fn test_parse_other_lines() {
        assert_eq!(parse_sse_line(""), SseLine::Empty);
        assert_eq!(
            parse_sse_line(": keep-alive"),
            SseLine::Comment("keep-alive".to_string())
        );
        assert_eq!(
            parse_sse_line("event: message"),
            SseLine::Field("event: message".to_string())
        );
    }

    #[test]
    fn test_comment_only_frame_yields_nothing() {
        assert_eq!(decode_frame(": keep-alive"), Ok(None));
        assert_eq!(decode_frame(": stream-start\n: more"), Ok(None));
    }

    #[test]
    fn test_frame_without_data_yields_nothing() {
        assert_eq!(decode_frame(""), Ok(None));
        assert_eq!(decode_frame("event: message"), Ok(None));
    }

    #[test]
    fn test_multiline_data_joined_with_newline() {
        let frame = "data: {\"event\":\"message_delta\",\ndata: \"data\":{\"delta\":\"hi\"}}";
        assert_eq!(
            decode_frame(frame),
            Ok(Some(StreamEvent::MessageDelta {
                delta: "hi".to_string()
            }))
        );
    }

    #[test]
    fn test_decode_metadata() {
        let frame =
            r#"data: {"event":"metadata","data":{"message_id":"m1","conversation_id":"c9"}}"#;
        assert_eq!(
            decode_frame(frame),
            Ok(Some(StreamEvent::Metadata {
                message_id: Some("m1".to_string()),
                conversation_id: Some("c9".to_string()),
            }))
        );
    }

    #[test]
    fn test_decode_retrievals_keeps_extra_fields() {
        let frame = r#"data: {"event":"retrievals","data":{"contents":[{"content_id":"c1","content_text":"t","page":3}]}}"#;
        let Ok(Some(StreamEvent::Retrievals { contents })) = decode_frame(frame) else {
            panic!("expected retrievals");
        };
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].id(), Some("c1"));
        assert_eq!(contents[0].extra["page"], 3);
    }

    #[test]
    fn test_decode_retrievals_with_null_fields() {
        let frame = r#"data: {"event":"retrievals","data":{"contents":[{"content_id":"c1","content_text":"a"},{"content_id":"c2","content_text":null},{"content_id":null,"content_text":"b"}]}}"#;
        let Ok(Some(StreamEvent::Retrievals { contents })) = decode_frame(frame) else {
            panic!("expected retrievals");
        };
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].id(), Some("c2"));
        assert_eq!(contents[1].content_text, "");
        assert_eq!(contents[2].id(), None);
        assert_eq!(contents[2].content_text, "b");
    }

    #[test]
    fn test_decode_end_without_data() {
        assert_eq!(
            decode_frame(r#"data: {"event":"end"}"#),
            Ok(Some(StreamEvent::End))
        );
        assert_eq!(
            decode_frame(r#"data: {"event":"end","data":{}}"#),
            Ok(Some(StreamEvent::End))
        );
    }

    #[test]
    fn test_decode_unknown_event() {
        assert_eq!(
            decode_frame(r#"data: {"event":"usage","data":{"tokens":3}}"#),
            Ok(Some(StreamEvent::Unknown {
                event: "usage".to_string()
            }))
        );
    }

    #[test]
    fn test_decode_legacy_error_envelope() {
        assert_eq!(
            decode_frame(r#"data: {"error":"Upstream error 500: boom"}"#),
            Ok(Some(StreamEvent::Error {
                message: Some("Upstream error 500: boom".to_string())
            }))
        );
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            decode_frame("data: {not json"),
            Err(SseParseError::InvalidJson { .. })
        ));
        assert_eq!(
            decode_frame(r#"data: {"data":{}}"#),
            Err(SseParseError::MissingEventType)
        );
        assert!(matches!(
            decode_frame(r#"data: {"event":"retrievals","data":{"contents":"nope"}}"#),
            Err(SseParseError::InvalidPayload { .. })
        ));
    }

    #[test]
    fn test_decoder_skips_malformed_frame_between_valid_ones() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed(
            b"data: {\"event\":\"message_delta\",\"data\":{\"delta\":\"a\"}}\n\n\
              data: {broken\n\n\
              data: {\"event\":\"message_delta\",\"data\":{\"delta\":\"b\"}}\n\n",
        );
        assert_eq!(
            events,
            vec![
                StreamEvent::MessageDelta {
                    delta: "a".to_string()
                },
                StreamEvent::MessageDelta {
                    delta: "b".to_string()
                },
            ]
        );
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn test_rechunking_yields_same_events() {
        let stream: &[u8] = b": stream-start\n\n\
            data: {\"event\":\"metadata\",\"data\":{\"message_id\":\"m1\"}}\r\n\r\n\
            data: {\"event\":\"retrievals\",\"data\":{\"contents\":[{\"content_id\":\"c1\",\"content_text\":\"caf\xc3\xa9\"}]}}\n\n\
            : keep-alive\n\n\
            data: {\"event\":\"message_delta\",\"data\":{\"delta\":\"Hel\"}}\r\r\
            data: {\"event\":\"message_delta\",\"data\":{\"delta\":\"lo\"}}\n\n\
            data: {\"event\":\"end\",\"data\":{}}\n\n";

        let mut whole = SseDecoder::new();
        let expected = whole.feed(stream);
        assert_eq!(expected.len(), 5);
        assert_eq!(
            expected[1],
            StreamEvent::Retrievals {
                contents: vec![RetrievalContent::new("c1", "café")]
            }
        );

        for size in [1, 2, 3, 7, 13, 64] {
            let mut decoder = SseDecoder::new();
            let events: Vec<_> = stream.chunks(size).flat_map(|c| decoder.feed(c)).collect();
            assert_eq!(events, expected, "chunk size {}", size);
        }
    }
}
