//! Streaming-related error types.
//!
//! Errors that end a relayed or consumed event stream after it was opened.

use std::fmt;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The byte stream failed mid-read.
    ConnectionLost { message: String },
}

impl StreamError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::ConnectionLost { message } => {
                write!(f, "Stream connection lost: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}
