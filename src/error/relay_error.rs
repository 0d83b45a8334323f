//! Unified error type for the relay and its client.

use std::fmt;

use super::category::ErrorCategory;
use super::config::ConfigError;
use super::network::NetworkError;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type.
///
/// Decode failures of individual frames are deliberately absent: they are
/// skipped where they happen and never travel as a `RelayError`.
#[derive(Debug)]
pub enum RelayError {
    /// Network-related errors (connections, HTTP status, bodies).
    Network(NetworkError),

    /// Errors that ended an already-open event stream.
    Stream(StreamError),

    /// Missing or invalid settings.
    Config(ConfigError),

    /// The caller's request was rejected before any I/O happened.
    InvalidRequest { message: String },
}

impl RelayError {
    /// Shorthand for [`RelayError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        RelayError::InvalidRequest {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::Server,
            RelayError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Server,
            RelayError::Network(_) => ErrorCategory::Network,
            RelayError::Stream(_) => ErrorCategory::Network,
            RelayError::Config(_) => ErrorCategory::Configuration,
            RelayError::InvalidRequest { .. } => ErrorCategory::User,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayError::Network(err) => err.error_code(),
            RelayError::Stream(err) => err.error_code(),
            RelayError::Config(err) => err.error_code(),
            RelayError::InvalidRequest { .. } => "E_REQ_INVALID",
        }
    }

    /// Upstream HTTP status, when the failure was a status error.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RelayError::Network(err) => err.status(),
            _ => None,
        }
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Network(err) => write!(f, "{}", err),
            RelayError::Stream(err) => write!(f, "{}", err),
            RelayError::Config(err) => write!(f, "{}", err),
            RelayError::InvalidRequest { message } => write!(f, "Invalid request: {}", message),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Network(err) => Some(err),
            RelayError::Stream(err) => Some(err),
            RelayError::Config(err) => Some(err),
            RelayError::InvalidRequest { .. } => None,
        }
    }
}

// ============================================================================
// From implementations for automatic error conversion
// ============================================================================

impl From<NetworkError> for RelayError {
    fn from(err: NetworkError) -> Self {
        RelayError::Network(err)
    }
}

impl From<StreamError> for RelayError {
    fn from(err: StreamError) -> Self {
        RelayError::Stream(err)
    }
}

impl From<ConfigError> for RelayError {
    fn from(err: ConfigError) -> Self {
        RelayError::Config(err)
    }
}

impl From<HttpError> for RelayError {
    fn from(err: HttpError) -> Self {
        RelayError::Network(err.into())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}
