use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder;
use tracing::error;
use tracing_subscriber::EnvFilter;

use link_state_router::agent::RouterAgent;
use link_state_router::config::{parse_directory_spec, parse_neighbor_spec, RouterConfig};
use link_state_router::control::ControlServer;

#[derive(Parser)]
#[command(
    name = "link-state-router",
    about = "Link-state routing daemon flooding JSON advertisements over UDP"
)]
struct Cli {
    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Router identifier, e.g. R1.
    #[arg(long)]
    id: Option<String>,

    /// UDP port to listen on for link-state packets.
    #[arg(long)]
    port: Option<u16>,

    /// Direct neighbors as ID=COST pairs, e.g. "R2=1,R3=3".
    #[arg(long)]
    neighbors: Option<String>,

    /// Domain directory as ID=HOST:PORT entries, e.g. "R2=10.0.0.2:5002".
    #[arg(long)]
    directory: Option<String>,

    /// Milliseconds between flood cycles.
    #[arg(long)]
    flood_interval_ms: Option<u64>,

    /// Defer route recomputation until every neighbor has advertised.
    #[arg(long)]
    wait_for_neighbors: bool,

    /// Enable the TCP control endpoint on this port.
    #[arg(long)]
    control_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Config file first, then flag overrides on top.
fn resolve_config(cli: &Cli) -> Result<RouterConfig> {
    let mut config = match &cli.config {
        Some(path) => RouterConfig::load_from_file(path)?,
        None => RouterConfig::default(),
    };

    if let Some(id) = &cli.id {
        config.router_id = id.clone();
    }
    if let Some(port) = cli.port {
        config.listen_port = port;
    }
    if let Some(spec) = &cli.neighbors {
        config.neighbors = parse_neighbor_spec(spec)?;
    }
    if let Some(spec) = &cli.directory {
        config.directory = parse_directory_spec(spec)?;
    }
    if let Some(ms) = cli.flood_interval_ms {
        config.flood_interval_ms = ms;
    }
    if cli.wait_for_neighbors {
        config.wait_for_neighbors = true;
    }
    if let Some(port) = cli.control_port {
        config.control_port = Some(port);
    }

    if config.router_id.is_empty() {
        bail!("router id is required, pass --id or provide a config file");
    }
    if config.listen_port == 0 {
        bail!("listen port is required, pass --port or provide a config file");
    }
    Ok(config)
}

async fn run(config: RouterConfig) -> Result<()> {
    let agent = RouterAgent::bind(config).await?;
    let config = agent.config();

    match config.control_port {
        Some(port) => {
            let server = ControlServer::bind(port, Arc::clone(&config), agent.state()).await?;

            let agent_task = tokio::spawn(async move {
                if let Err(e) = agent.start().await {
                    error!("router agent error: {}", e);
                }
            });
            let control_task = tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    error!("control server error: {}", e);
                }
            });

            tokio::select! {
                _ = agent_task => {
                    error!("router agent task terminated");
                }
                _ = control_task => {
                    error!("control server task terminated");
                }
            }
            Ok(())
        }
        None => agent.start().await,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = resolve_config(&cli)?;

    let rt = Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(run(config))
}
