use citation_relay::cli::{parse_args, run_cli_command, CliCommand};
use citation_relay::config::RelayConfig;
use citation_relay::server::start_server;

use color_eyre::Result;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "citation_relay=info";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    // Flags that print and exit run before any initialization
    let command = parse_args(std::env::args());
    if let Some(code) = run_cli_command(&command) {
        std::process::exit(code);
    }

    color_eyre::install()?;
    init_tracing();

    let mut config = RelayConfig::from_env();
    if let CliCommand::Serve { bind: Some(addr) } = command {
        config = config.with_bind_addr(addr);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (handle, addr) = start_server(config).await?;
        tracing::info!(%addr, "citation-relay {} ready", citation_relay::cli::VERSION);
        handle.await?;
        Ok::<(), color_eyre::Report>(())
    })
}
