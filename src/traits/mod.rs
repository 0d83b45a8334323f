//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, streaming)
//! - [`MetadataLookup`] - retrieval metadata enrichment

pub mod http;
pub mod metadata;

pub use http::{
    bearer_json_headers, json_headers, ByteStream, Headers, HttpClient, HttpError, Response,
};
pub use metadata::MetadataLookup;
