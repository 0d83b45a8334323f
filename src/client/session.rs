//! A conversation driven through the relay.

use futures::StreamExt;

use crate::error::{RelayError, RelayResult};
use crate::models::{ChatMessage, Citation, Message, MessageList, Slot};
use crate::traits::MetadataLookup;

use super::chat::ChatClient;
use super::reconciler::{ClientReconciler, Reconciled};

/// How one turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSummary {
    /// Assistant entry written by this turn
    pub slot: Option<Slot>,
    /// The turn failed and the fallback message was shown
    pub failed: bool,
    /// A fallback metadata lookup ran after the stream closed
    pub fallback_lookup: bool,
}

/// Message list plus the client that fills it.
#[derive(Debug)]
pub struct ChatSession {
    client: ChatClient,
    messages: MessageList,
    loading: bool,
}

impl ChatSession {
    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            messages: MessageList::new(),
            loading: false,
        }
    }

    pub fn messages(&self) -> &MessageList {
        &self.messages
    }

    /// True while a turn is waiting for its first answer text.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Send a user message and fold the streamed answer into the list.
    ///
    /// Blank input is rejected without any request. Every other failure is
    /// absorbed into the turn: the fallback assistant message is shown and
    /// the summary reports `failed`.
    pub async fn send(&mut self, text: &str) -> RelayResult<TurnSummary> {
        if text.trim().is_empty() {
            return Err(RelayError::invalid_request("Message is empty"));
        }

        self.messages.push(Message::user(text));
        let history: Vec<ChatMessage> = self.messages.iter().map(Message::to_chat_message).collect();

        self.loading = true;
        let mut reconciler = ClientReconciler::new();
        let failed = self.stream_turn(&history, &mut reconciler).await;

        let mut fallback_lookup = false;
        if !failed {
            if let Some(request) = reconciler.finish(&mut self.messages) {
                fallback_lookup = true;
                match self
                    .client
                    .retrieval_info(&request.message_id, &request.content_ids)
                    .await
                {
                    Ok(metadatas) => reconciler.apply_metadata(&mut self.messages, &metadatas),
                    Err(e) => {
                        tracing::warn!(
                            message_id = %request.message_id,
                            code = e.error_code(),
                            "Fallback metadata lookup failed: {}",
                            e
                        );
                    }
                }
            }
        }
        self.loading = false;

        Ok(TurnSummary {
            slot: reconciler.slot(),
            failed,
            fallback_lookup,
        })
    }

    /// Returns true when the turn failed.
    async fn stream_turn(
        &mut self,
        history: &[ChatMessage],
        reconciler: &mut ClientReconciler,
    ) -> bool {
        let mut events = match self.client.stream_chat(history).await {
            Ok(events) => events,
            Err(e) => {
                reconciler.fail(&mut self.messages, Some(&e.to_string()));
                return true;
            }
        };

        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if reconciler.apply(&mut self.messages, &event) == Reconciled::Failed {
                        return true;
                    }
                }
                Err(e) => {
                    reconciler.fail(&mut self.messages, Some(&e.to_string()));
                    return true;
                }
            }
            self.loading = reconciler.is_loading();
        }

        false
    }

    /// Citation `index` (0-based) of the message at `slot`.
    ///
    /// When the detailed entry has no page image yet, one lookup for that
    /// single content id is made; a failed lookup still returns the citation
    /// with its text.
    pub async fn citation_detail(&self, slot: Slot, index: usize) -> Option<Citation> {
        let message = self.messages.get(slot)?;
        let mut citation = message.citation(index)?;
        if citation.has_page_image() {
            return Some(citation);
        }

        let message_id = message.message_id.as_deref().filter(|id| !id.is_empty());
        let content_id = citation
            .retrieval
            .as_ref()
            .and_then(|r| r.id())
            .map(str::to_string);
        let (Some(message_id), Some(content_id)) = (message_id, content_id) else {
            return Some(citation);
        };

        match self.client.retrieval_info(message_id, &[content_id]).await {
            Ok(metadatas) => {
                if let Some(img) = metadatas
                    .into_iter()
                    .next()
                    .and_then(|m| m.page_img)
                    .filter(|img| !img.is_empty())
                {
                    citation.page_img = Some(img);
                }
            }
            Err(e) => tracing::debug!("Citation image lookup failed: {}", e),
        }

        Some(citation)
    }
}
