//! Retrieved source snippets and their enrichment metadata.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// One retrieved source snippet the agent used to ground its answer.
///
/// Fields beyond `content_id` and `content_text` (document name, page,
/// scores...) are kept verbatim in `extra` so the original entry survives a
/// round trip through the relay and the reconciler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `null` reads as the type's default, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RetrievalContent {
    pub fn new(content_id: impl Into<String>, content_text: impl Into<String>) -> Self {
        Self {
            content_id: Some(content_id.into()),
            content_text: content_text.into(),
            extra: Map::new(),
        }
    }

    /// The content id, ignoring empty strings.
    pub fn id(&self) -> Option<&str> {
        self.content_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Enrichment result for one retrieval.
///
/// `content_id` may be missing, in which case metadata is paired with
/// retrievals by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    /// Base64-encoded page image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_img: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentMetadata {
    pub fn with_id(content_id: impl Into<String>, page_img: Option<String>) -> Self {
        Self {
            content_id: Some(content_id.into()),
            page_img,
            extra: Map::new(),
        }
    }

    pub fn positional(page_img: Option<String>) -> Self {
        Self {
            content_id: None,
            page_img,
            extra: Map::new(),
        }
    }

    /// The content id, ignoring empty strings.
    pub fn id(&self) -> Option<&str> {
        self.content_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A retrieval joined with its enrichment metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetailedRetrieval {
    pub content_text: String,
    pub page_img: Option<String>,
    pub original: RetrievalContent,
}

impl DetailedRetrieval {
    /// Placeholder entry: text only, no imagery yet.
    pub fn placeholder(original: &RetrievalContent) -> Self {
        Self {
            content_text: original.content_text.clone(),
            page_img: None,
            original: original.clone(),
        }
    }

    /// Decode the page image. Returns `None` when there is no image or the
    /// payload is not valid base64.
    pub fn page_image_bytes(&self) -> Option<Vec<u8>> {
        decode_page_image(self.page_img.as_deref()?)
    }
}

/// Decode a base64 page image, tolerating a `data:` URL prefix.
pub fn decode_page_image(encoded: &str) -> Option<Vec<u8>> {
    let raw = match encoded.split_once(";base64,") {
        Some((_, data)) => data,
        None => encoded,
    };
    STANDARD.decode(raw.trim()).ok()
}

/// Content ids in first-seen order, without duplicates.
///
/// Grows only: ids are never removed once inserted. Empty and missing ids
/// are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentIdSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ContentIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every retrieval in `contents` that carries one.
    pub fn from_retrievals(contents: &[RetrievalContent]) -> Self {
        let mut set = Self::new();
        set.extend_from(contents);
        set
    }

    /// Insert an id. Returns `false` if it was empty or already present.
    pub fn insert(&mut self, id: &str) -> bool {
        if id.is_empty() || self.seen.contains(id) {
            return false;
        }
        self.seen.insert(id.to_string());
        self.order.push(id.to_string());
        true
    }

    pub fn extend_from(&mut self, contents: &[RetrievalContent]) {
        for id in contents.iter().filter_map(RetrievalContent::id) {
            self.insert(id);
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
