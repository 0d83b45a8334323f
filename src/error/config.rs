//! Configuration error types.

use thiserror::Error;

/// Missing or invalid relay settings.
///
/// The messages for the two credential variants are what the HTTP routes
/// return verbatim in their `error` field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `CONTEXTUAL_API_KEY` is not set
    #[error("API key not configured. Please set CONTEXTUAL_API_KEY in the environment")]
    MissingApiKey,

    /// `CONTEXTUAL_AGENT_ID` is not set
    #[error("Agent ID not configured. Please set CONTEXTUAL_AGENT_ID in the environment")]
    MissingAgentId,

    /// A value could not be parsed
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::MissingApiKey => "E_CFG_API_KEY",
            ConfigError::MissingAgentId => "E_CFG_AGENT",
            ConfigError::InvalidValue { .. } => "E_CFG_INVALID",
        }
    }
}
