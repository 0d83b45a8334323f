//! Side-channel observation of the relayed byte stream.

use crate::models::ContentIdSet;
use crate::sse::encode::FRAME_END;
use crate::sse::{SseDecoder, StreamEvent};

/// Identifiers captured while a stream passed through the relay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamObservation {
    /// First message id announced by a `metadata` event
    pub message_id: Option<String>,
    /// Every content id of every `retrievals` snapshot, first-seen order
    pub content_ids: ContentIdSet,
}

impl StreamObservation {
    /// Message id and content ids, if both are present.
    pub fn lookup_key(&self) -> Option<(&str, &[String])> {
        let message_id = self.message_id.as_deref()?;
        if self.content_ids.is_empty() {
            return None;
        }
        Some((message_id, self.content_ids.as_slice()))
    }
}

/// Private decoder fed with a copy of every forwarded chunk.
///
/// Decode failures are swallowed by the decoder; nothing here can disturb
/// forwarding.
#[derive(Debug, Default)]
pub struct StreamObserver {
    decoder: SseDecoder,
    observation: StreamObservation,
}

impl StreamObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, chunk: &[u8]) {
        for event in self.decoder.feed(chunk) {
            match event {
                StreamEvent::Metadata {
                    message_id: Some(id),
                    ..
                } if self.observation.message_id.is_none() => {
                    tracing::debug!(message_id = %id, "Observed message id");
                    self.observation.message_id = Some(id);
                }
                StreamEvent::Retrievals { contents } => {
                    self.observation.content_ids.extend_from(&contents);
                }
                _ => {}
            }
        }
    }

    /// Close a trailing frame left without its blank line.
    ///
    /// Returns true when a separator was supplied; the caller must then send
    /// the same separator downstream.
    pub fn close_partial_frame(&mut self) -> bool {
        if !self.decoder.has_partial_frame() {
            return false;
        }
        self.observe(FRAME_END);
        true
    }

    pub fn observation(&self) -> &StreamObservation {
        &self.observation
    }

    pub fn into_observation(self) -> StreamObservation {
        self.observation
    }
}
