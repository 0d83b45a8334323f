//! Error category classification.
//!
//! Categories pick the HTTP status of a failed JSON route and tag log lines.

use std::fmt;

/// High-level categorization of relay errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection or timeout failures talking to a peer.
    Network,

    /// The peer answered with a non-success status or an error event.
    Server,

    /// Malformed data or invalid state on our side.
    Client,

    /// The caller sent an invalid request.
    User,

    /// Missing or invalid settings (API key, agent id, bind address).
    Configuration,
}

impl ErrorCategory {
    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// HTTP status the relay answers with when an error of this category
    /// ends a JSON request. Server errors carrying an upstream status answer
    /// with that status instead.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCategory::Network => 500,
            ErrorCategory::Server => 500,
            ErrorCategory::Client => 500,
            ErrorCategory::User => 400,
            ErrorCategory::Configuration => 500,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_as_str() {
        assert_eq!(ErrorCategory::Network.as_str(), "network");
        assert_eq!(ErrorCategory::Server.as_str(), "server");
        assert_eq!(ErrorCategory::Client.as_str(), "client");
        assert_eq!(ErrorCategory::User.as_str(), "user");
        assert_eq!(ErrorCategory::Configuration.as_str(), "configuration");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
        assert_eq!(format!("{}", ErrorCategory::Configuration), "configuration");
    }

    #[test]
    fn test_category_http_status() {
        assert_eq!(ErrorCategory::User.http_status(), 400);
        assert_eq!(ErrorCategory::Configuration.http_status(), 500);
        assert_eq!(ErrorCategory::Network.http_status(), 500);
        assert_eq!(ErrorCategory::Server.http_status(), 500);
    }
}
