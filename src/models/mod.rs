//! Data models for the conversation, retrievals, and request bodies.

mod list;
mod message;
mod request;
mod retrieval;

pub use list::{MessageList, Slot};
pub use message::{Citation, Message, MessageRole};
pub use request::{
    AgentQueryRequest, ChatMessage, ChatRequest, ErrorBody, RetrievalInfoRequest,
    RetrievalInfoResponse,
};
pub use retrieval::{
    decode_page_image, ContentIdSet, ContentMetadata, DetailedRetrieval, RetrievalContent,
};
