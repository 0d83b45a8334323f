use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::retrieval::{DetailedRetrieval, RetrievalContent};
use super::ChatMessage;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message in the reconstructed conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    /// Latest retrieval snapshot for this answer
    #[serde(default)]
    pub retrievals: Vec<RetrievalContent>,
    /// Retrievals joined with enrichment metadata, same order as `retrievals`
    #[serde(default)]
    pub detailed_retrievals: Vec<DetailedRetrieval>,
    #[serde(default)]
    pub message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content.into())
    }

    fn new(role: MessageRole, content: String) -> Self {
        Self {
            role,
            content,
            retrievals: Vec::new(),
            detailed_retrievals: Vec::new(),
            message_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }

    /// The role/content pair sent upstream as conversation history.
    pub fn to_chat_message(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }

    /// Build the citation view for the 0-based retrieval `index`.
    ///
    /// Prefers the detailed entry and falls back to the raw snapshot, so a
    /// citation can be shown before enrichment has arrived.
    pub fn citation(&self, index: usize) -> Option<Citation> {
        let retrieval = self.retrievals.get(index);
        let detailed = self.detailed_retrievals.get(index);
        if retrieval.is_none() && detailed.is_none() {
            return None;
        }

        let content_text = detailed
            .map(|d| d.content_text.clone())
            .filter(|text| !text.is_empty())
            .or_else(|| retrieval.map(|r| r.content_text.clone()))
            .unwrap_or_default();

        Some(Citation {
            number: index + 1,
            content_text,
            page_img: detailed.and_then(|d| d.page_img.clone()),
            retrieval: retrieval
                .cloned()
                .or_else(|| detailed.map(|d| d.original.clone())),
        })
    }
}

/// What a reader sees when opening citation `[number]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    /// 1-based citation number as it appears in the answer text
    pub number: usize,
    pub content_text: String,
    pub page_img: Option<String>,
    pub retrieval: Option<RetrievalContent>,
}

impl Citation {
    pub fn has_page_image(&self) -> bool {
        self.page_img.as_deref().is_some_and(|img| !img.is_empty())
    }
}
