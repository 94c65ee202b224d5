use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use crate::config::RouterConfig;
use crate::SharedRouterState;

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlCommand {
    pub command: String,
    pub args: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ControlResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Loopback TCP endpoint for inspecting a running router. One JSON command
/// per line, one JSON response per line.
pub struct ControlServer {
    listener: TcpListener,
    config: Arc<RouterConfig>,
    state: SharedRouterState,
}

impl ControlServer {
    pub async fn bind(port: u16, config: Arc<RouterConfig>, state: SharedRouterState) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind control port {}", port))?;
        Ok(Self {
            listener,
            config,
            state,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn start(self) -> Result<()> {
        info!("control server listening on {}", self.local_addr()?);
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("control connection from {}", addr);
                    let config = Arc::clone(&self.config);
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(stream, config, state).await {
                            error!("error handling control client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("failed to accept control connection: {}", e);
                }
            }
        }
    }
}

async fn handle_client(
    mut stream: TcpStream,
    config: Arc<RouterConfig>,
    state: SharedRouterState,
) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut buf_reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<ControlCommand>(trimmed) {
                    Ok(command) => process_command(command, &config, &state).await,
                    Err(e) => ControlResponse::failure(format!("invalid JSON command: {}", e)),
                };

                let response_json = serde_json::to_string(&response)?;
                writer
                    .write_all(format!("{}\n", response_json).as_bytes())
                    .await?;
                writer.flush().await?;
            }
            Err(e) => {
                error!("error reading from control client: {}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn process_command(
    command: ControlCommand,
    config: &RouterConfig,
    state: &SharedRouterState,
) -> ControlResponse {
    match command.command.as_str() {
        "status" => get_status(config, state).await,
        "routes" => get_routes(state).await,
        "database" => get_database(state).await,
        "ping" => ControlResponse {
            success: true,
            message: "pong".to_string(),
            data: None,
        },
        "help" => get_help(),
        _ => ControlResponse::failure(format!("unknown command: {}", command.command)),
    }
}

async fn get_status(config: &RouterConfig, state: &SharedRouterState) -> ControlResponse {
    let state = state.read().await;
    ControlResponse {
        success: true,
        message: "status retrieved".to_string(),
        data: Some(serde_json::json!({
            "router_id": config.router_id,
            "neighbors": config.neighbors.len(),
            "database_size": state.lsdb.len(),
            "routes": state.routing_table.len(),
        })),
    }
}

async fn get_routes(state: &SharedRouterState) -> ControlResponse {
    let state = state.read().await;
    let routes: HashMap<_, _> = state.routing_table.iter().collect();
    ControlResponse {
        success: true,
        message: format!("retrieved {} routes", routes.len()),
        data: Some(serde_json::to_value(routes).unwrap()),
    }
}

async fn get_database(state: &SharedRouterState) -> ControlResponse {
    let state = state.read().await;
    let entries = state.lsdb.snapshot();
    ControlResponse {
        success: true,
        message: format!("retrieved {} database entries", entries.len()),
        data: Some(serde_json::to_value(entries).unwrap()),
    }
}

fn get_help() -> ControlResponse {
    let commands = vec![
        ("status", "Summary of the running router"),
        ("routes", "Current routing table"),
        ("database", "Current link-state database"),
        ("ping", "Liveness check"),
        ("help", "Show this help message"),
    ];

    ControlResponse {
        success: true,
        message: "available commands".to_string(),
        data: Some(serde_json::to_value(commands).unwrap()),
    }
}
