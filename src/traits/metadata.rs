//! Retrieval metadata lookup seam.

use async_trait::async_trait;

use crate::error::RelayResult;
use crate::models::ContentMetadata;

/// One-shot lookup of enrichment metadata for a finished answer.
///
/// The relay implements this against the agent service directly; the chat
/// client implements it against the relay's `/api/retrieval-info` route.
/// Callers make a single attempt and degrade gracefully on error.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn retrieval_info(
        &self,
        message_id: &str,
        content_ids: &[String],
    ) -> RelayResult<Vec<ContentMetadata>>;
}
