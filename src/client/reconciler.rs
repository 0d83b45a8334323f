//! Folding a turn's stream events into the message list.
//!
//! One [`ClientReconciler`] per turn. It owns at most one assistant entry,
//! addressed through the [`Slot`] captured when the entry was appended:
//!
//! ```text
//! Absent --first delta / message_complete--> Open(slot)
//! Open   --error / stream close------------> Closed
//! Absent --error / stream close------------> Closed
//! ```

use crate::models::{
    ContentIdSet, ContentMetadata, DetailedRetrieval, Message, MessageList, RetrievalContent, Slot,
};
use crate::sse::StreamEvent;

use super::merge::merge_metadata;

/// Assistant text shown when a turn fails.
pub const FALLBACK_MESSAGE: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnState {
    Absent,
    Open(Slot),
    Closed(Option<Slot>),
}

/// What the caller should do after an event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// Keep reading the stream.
    Continue,
    /// The turn failed and the fallback message was surfaced; stop reading.
    Failed,
}

/// Lookup to run when the stream closed without enrichment metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub message_id: String,
    pub content_ids: Vec<String>,
}

/// Per-turn reconciliation state.
#[derive(Debug)]
pub struct ClientReconciler {
    state: TurnState,
    /// Delta text accepted so far
    accumulated: String,
    /// Latest retrieval snapshot
    snapshot: Vec<RetrievalContent>,
    message_id: Option<String>,
    /// `message_complete` arrived; later deltas are ignored
    completed: bool,
    metadata_applied: bool,
    ended: bool,
    pending: bool,
}

impl Default for ClientReconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientReconciler {
    pub fn new() -> Self {
        Self {
            state: TurnState::Absent,
            accumulated: String::new(),
            snapshot: Vec::new(),
            message_id: None,
            completed: false,
            metadata_applied: false,
            ended: false,
            pending: true,
        }
    }

    /// True until the first answer text (or the failure message) is visible.
    pub fn is_loading(&self) -> bool {
        self.pending
    }

    /// Slot of the assistant entry owned by this turn, if one was appended.
    pub fn slot(&self) -> Option<Slot> {
        match self.state {
            TurnState::Open(slot) | TurnState::Closed(Some(slot)) => Some(slot),
            _ => None,
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// True once an `end` event was seen.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, TurnState::Closed(_))
    }

    /// Apply one stream event.
    pub fn apply(&mut self, list: &mut MessageList, event: &StreamEvent) -> Reconciled {
        if self.is_closed() {
            tracing::debug!(event = event.event_type_name(), "Ignoring event after turn closed");
            return Reconciled::Continue;
        }

        match event {
            StreamEvent::Metadata { message_id, .. } => {
                if let Some(id) = message_id.as_deref().filter(|id| !id.is_empty()) {
                    self.record_message_id(list, id);
                }
            }
            StreamEvent::Retrievals { contents } => self.replace_snapshot(list, contents),
            StreamEvent::MessageDelta { delta } => self.apply_delta(list, delta),
            StreamEvent::MessageComplete {
                final_message: Some(text),
            } => self.complete(list, text),
            StreamEvent::MessageComplete { final_message: None } => {
                tracing::debug!("message_complete without final_message");
            }
            StreamEvent::ContentMetadatas { content_metadatas } => {
                self.apply_metadata(list, content_metadatas);
            }
            StreamEvent::End => self.ended = true,
            StreamEvent::Error { message } => {
                self.fail(list, message.as_deref());
                return Reconciled::Failed;
            }
            StreamEvent::Attributions { .. } | StreamEvent::Unknown { .. } => {}
        }

        Reconciled::Continue
    }

    /// Merge enrichment metadata into the owned entry.
    ///
    /// Dropped when no entry was appended. Applying the same metadata again
    /// leaves the entry unchanged.
    pub fn apply_metadata(&mut self, list: &mut MessageList, metadatas: &[ContentMetadata]) {
        let Some(entry) = self.slot().and_then(|slot| list.assistant_mut(slot)) else {
            tracing::debug!("Dropping content metadata, no assistant entry");
            return;
        };
        entry.detailed_retrievals = merge_metadata(&self.snapshot, metadatas);
        self.metadata_applied = true;
    }

    /// Abort the turn and surface the fallback message.
    ///
    /// The owned entry is replaced in place; without one, a new assistant
    /// entry is appended.
    pub fn fail(&mut self, list: &mut MessageList, reason: Option<&str>) {
        tracing::warn!(reason = reason.unwrap_or("unknown"), "Chat turn failed");

        let slot = match self.state {
            TurnState::Open(slot) | TurnState::Closed(Some(slot)) => match list.assistant_mut(slot) {
                Some(entry) => {
                    entry.content = FALLBACK_MESSAGE.to_string();
                    entry.retrievals.clear();
                    entry.detailed_retrievals.clear();
                    slot
                }
                None => list.push(Message::assistant(FALLBACK_MESSAGE)),
            },
            _ => list.push(Message::assistant(FALLBACK_MESSAGE)),
        };

        self.state = TurnState::Closed(Some(slot));
        self.pending = false;
    }

    /// Close the turn after the stream ended without an error.
    ///
    /// Appends the entry if nothing was appended yet and there is something
    /// to show. Returns the fallback lookup to run when no metadata was
    /// applied and both a message id and content ids are known.
    pub fn finish(&mut self, list: &mut MessageList) -> Option<EnrichmentRequest> {
        let slot = match self.state {
            TurnState::Closed(_) => return None,
            TurnState::Open(slot) => Some(slot),
            TurnState::Absent => {
                if self.accumulated.is_empty() && self.snapshot.is_empty() {
                    None
                } else {
                    Some(self.append_entry(list, self.accumulated.clone()))
                }
            }
        };

        self.state = TurnState::Closed(slot);
        self.pending = false;

        if self.metadata_applied || slot.is_none() {
            return None;
        }
        let message_id = self.message_id.clone()?;
        let content_ids = ContentIdSet::from_retrievals(&self.snapshot);
        if content_ids.is_empty() {
            return None;
        }

        Some(EnrichmentRequest {
            message_id,
            content_ids: content_ids.to_vec(),
        })
    }

    fn record_message_id(&mut self, list: &mut MessageList, id: &str) {
        if self.message_id.is_some() {
            return;
        }
        self.message_id = Some(id.to_string());
        if let Some(entry) = self.slot().and_then(|slot| list.assistant_mut(slot)) {
            entry.message_id = self.message_id.clone();
        }
    }

    fn replace_snapshot(&mut self, list: &mut MessageList, contents: &[RetrievalContent]) {
        self.snapshot = contents.to_vec();
        self.metadata_applied = false;
        if let Some(entry) = self.slot().and_then(|slot| list.assistant_mut(slot)) {
            entry.retrievals = self.snapshot.clone();
            entry.detailed_retrievals = placeholders(&self.snapshot);
        }
    }

    fn apply_delta(&mut self, list: &mut MessageList, delta: &str) {
        if self.completed {
            tracing::debug!("Ignoring delta after message_complete");
            return;
        }

        let candidate = format!("{}{}", self.accumulated, delta);
        match self.state {
            TurnState::Absent => {
                if candidate.is_empty() {
                    return;
                }
                self.accumulated = candidate.clone();
                self.append_entry(list, candidate);
            }
            TurnState::Open(slot) => {
                let Some(entry) = list.assistant_mut(slot) else {
                    return;
                };
                if candidate.len() <= entry.content.len() {
                    tracing::debug!(
                        stored = entry.content.len(),
                        candidate = candidate.len(),
                        "Rejecting non-growing delta"
                    );
                    return;
                }
                entry.content = candidate.clone();
                entry.message_id = self.message_id.clone();
                self.accumulated = candidate;
            }
            TurnState::Closed(_) => {}
        }
    }

    fn complete(&mut self, list: &mut MessageList, text: &str) {
        self.completed = true;
        self.accumulated = text.to_string();
        match self.state {
            TurnState::Absent => {
                self.append_entry(list, text.to_string());
            }
            TurnState::Open(slot) => {
                if let Some(entry) = list.assistant_mut(slot) {
                    entry.content = text.to_string();
                }
            }
            TurnState::Closed(_) => {}
        }
    }

    fn append_entry(&mut self, list: &mut MessageList, content: String) -> Slot {
        let mut entry = Message::assistant(content);
        entry.retrievals = self.snapshot.clone();
        entry.detailed_retrievals = placeholders(&self.snapshot);
        entry.message_id = self.message_id.clone();

        let slot = list.push(entry);
        self.state = TurnState::Open(slot);
        self.pending = false;
        slot
    }
}

fn placeholders(snapshot: &[RetrievalContent]) -> Vec<DetailedRetrieval> {
    snapshot.iter().map(DetailedRetrieval::placeholder).collect()
}
