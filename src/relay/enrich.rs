//! Post-stream metadata enrichment.

use std::sync::Arc;

use bytes::Bytes;

use super::observer::StreamObservation;
use crate::sse::encode::content_metadatas_event;
use crate::traits::MetadataLookup;

/// Performs the single lookup that follows a completed stream.
#[derive(Clone)]
pub struct MetadataEnricher {
    lookup: Arc<dyn MetadataLookup>,
}

impl MetadataEnricher {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self { lookup }
    }

    /// Build the synthetic `content_metadatas` frame for `observation`.
    ///
    /// Returns `None` without any I/O when no message id or no content id was
    /// observed, and `None` after logging a warning when the lookup fails.
    pub async fn enrich(&self, observation: &StreamObservation) -> Option<Bytes> {
        let (message_id, content_ids) = observation.lookup_key()?;

        match self.lookup.retrieval_info(message_id, content_ids).await {
            Ok(metadatas) => {
                tracing::info!(
                    message_id,
                    requested = content_ids.len(),
                    received = metadatas.len(),
                    "Retrieval metadata fetched"
                );
                Some(content_metadatas_event(&metadatas))
            }
            Err(e) => {
                tracing::warn!(message_id, code = e.error_code(), "Retrieval info lookup failed: {}", e);
                None
            }
        }
    }
}
