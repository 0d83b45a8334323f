//! Citation Relay - streams agent answers and enriches their citations
//!
//! The server side relays an agent's event stream to browsers, observes it on
//! the way through, and appends page-image metadata for the cited sources.
//! The client side decodes that stream and reconciles it into a message list.
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod agent;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod relay;
pub mod server;
pub mod sse;
pub mod traits;
