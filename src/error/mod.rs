//! Error handling for the relay and its client.
//!
//! - **Error Categories**: high-level classification used to pick an HTTP
//!   status
//! - **Domain-specific Errors**: network, stream, and configuration errors
//! - **Unified Error Type**: `RelayError` consolidates all of them
//! - **Result Type Alias**: `RelayResult<T>`
//!
//! | Category | Description | Surfaces as |
//! |----------|-------------|-------------|
//! | Network | Connection, timeout | `error` event / 500 |
//! | Server | Upstream non-success status or unreadable body | `error` event / upstream status, else 500 |
//! | Client | Invalid state on our side | 500 |
//! | User | Invalid request | 400 |
//! | Configuration | Missing API key or agent id | 500 |
//!
//! Nothing in this crate retries. Every network operation is a single attempt.

mod category;
mod config;
mod network;
mod relay_error;
mod stream;

pub use category::ErrorCategory;
pub use config::ConfigError;
pub use network::{classify_reqwest_error, NetworkError};
pub use relay_error::RelayError;
pub use stream::StreamError;

/// Type alias for Results using RelayError.
pub type RelayResult<T> = Result<T, RelayError>;
