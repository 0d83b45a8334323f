//! Consumer side of the relay.
//!
//! - `chat` - `ChatClient` for `/api/chat` and `/api/retrieval-info`
//! - `reconciler` - folds one turn's events into the message list
//! - `merge` - pairs a retrieval snapshot with enrichment metadata
//! - `session` - `ChatSession`, a conversation driven end to end
//! - `citations` - `[n]` marker helpers for answer text

mod chat;
mod citations;
mod merge;
mod reconciler;
mod session;

pub use chat::{ChatClient, EventStream};
pub use citations::{citation_numbers, clean_citation_markers};
pub use merge::merge_metadata;
pub use reconciler::{ClientReconciler, EnrichmentRequest, Reconciled, FALLBACK_MESSAGE};
pub use session::{ChatSession, TurnSummary};
