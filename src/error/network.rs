//! Network-related error types.
//!
//! Errors raised while talking to the upstream agent, the retrieval-info
//! lookup, or (on the client side) the relay itself.

use std::fmt;

/// Network-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    /// Connection to the peer failed.
    ConnectionFailed { url: String, message: String },

    /// Request timed out.
    Timeout { operation: String },

    /// HTTP status error (non-2xx response).
    HttpStatus { status: u16, message: String },

    /// The response body could not be read or decoded.
    InvalidResponse { message: String },

    /// Generic network error.
    Other { message: String },
}

impl NetworkError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed { .. } => "E_NET_CONN",
            NetworkError::Timeout { .. } => "E_NET_TIMEOUT",
            NetworkError::HttpStatus { .. } => "E_NET_HTTP",
            NetworkError::InvalidResponse { .. } => "E_NET_INVALID",
            NetworkError::Other { .. } => "E_NET_OTHER",
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetworkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::ConnectionFailed { url, message } => {
                write!(f, "Connection failed to '{}': {}", url, message)
            }
            NetworkError::Timeout { operation } => write!(f, "{} timed out", operation),
            NetworkError::HttpStatus { status, message } => {
                write!(f, "Upstream error {}: {}", status, message)
            }
            NetworkError::InvalidResponse { message } => {
                write!(f, "Invalid response: {}", message)
            }
            NetworkError::Other { message } => write!(f, "Network error: {}", message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Classify a reqwest error into a NetworkError.
pub fn classify_reqwest_error(err: &reqwest::Error, url: &str) -> NetworkError {
    if err.is_connect() {
        NetworkError::ConnectionFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    } else if err.is_timeout() {
        NetworkError::Timeout {
            operation: "HTTP request".to_string(),
        }
    } else if let Some(status) = err.status() {
        NetworkError::HttpStatus {
            status: status.as_u16(),
            message: err.to_string(),
        }
    } else if err.is_decode() || err.is_body() {
        NetworkError::InvalidResponse {
            message: err.to_string(),
        }
    } else {
        NetworkError::Other {
            message: err.to_string(),
        }
    }
}
