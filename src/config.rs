//! Relay configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default agent API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.contextual.ai/v1";
/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
/// Default interval between keep-alive comment frames.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

pub const ENV_API_KEY: &str = "CONTEXTUAL_API_KEY";
pub const ENV_AGENT_ID: &str = "CONTEXTUAL_AGENT_ID";
pub const ENV_API_BASE: &str = "CONTEXTUAL_API_BASE";
pub const ENV_BIND_ADDR: &str = "RELAY_BIND_ADDR";

/// Configuration for the relay server and its upstream agent.
///
/// Credentials are optional here: a server without them still starts, and
/// each request answers with a configuration error instead.
///
/// # Example
///
/// ```ignore
/// use citation_relay::config::RelayConfig;
///
/// let config = RelayConfig::default()
///     .with_api_key("key")
///     .with_agent_id("agent")
///     .with_bind_addr("0.0.0.0:8080");
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub agent_id: Option<String>,
    /// Agent API base URL, without trailing slash
    pub api_base: String,
    pub bind_addr: String,
    pub heartbeat_interval: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            agent_id: None,
            api_base: DEFAULT_API_BASE.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Set the agent API base URL. A trailing slash is removed.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Build configuration from the process environment.
    ///
    /// Empty variables count as unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::default();
        config.api_key = get(ENV_API_KEY);
        config.agent_id = get(ENV_AGENT_ID);
        if let Some(base) = get(ENV_API_BASE) {
            config = config.with_api_base(base);
        }
        if let Some(addr) = get(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        config
    }

    /// Both credentials, or the first one that is missing.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)?;
        let agent_id = self
            .agent_id
            .as_deref()
            .ok_or(ConfigError::MissingAgentId)?;
        Ok((api_key, agent_id))
    }
}
