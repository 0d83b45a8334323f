//! Version and usage output.

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const USAGE: &str = "\
Usage: citation-relay [--bind <addr>]

Relays agent answers as a server-sent event stream and enriches them with
citation page images.

Options:
  -b, --bind <addr>  Listen address (default 127.0.0.1:3000, env RELAY_BIND_ADDR)
  -V, --version      Print version and exit
  -h, --help         Print this help and exit

Environment:
  CONTEXTUAL_API_KEY   API key for the agent service
  CONTEXTUAL_AGENT_ID  Agent to query
  CONTEXTUAL_API_BASE  API base URL (default https://api.contextual.ai/v1)
  RUST_LOG             Log filter (default citation_relay=info)";

pub fn version_string() -> String {
    format!("citation-relay {}", VERSION)
}
