use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::packet::LinkStatePacket;
use crate::RouterId;

pub const DEFAULT_FLOOD_INTERVAL_MS: u64 = 5000;

fn default_flood_interval_ms() -> u64 {
    DEFAULT_FLOOD_INTERVAL_MS
}

/// Where a peer listens for link-state packets. The host is kept as a
/// string and resolved at send time, so a stale DNS name only costs one
/// flood cycle rather than failing startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterAddress {
    pub host: String,
    pub port: u16,
}

impl RouterAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Endpoint tuple accepted by `UdpSocket::send_to`.
    pub fn endpoint(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// Static per-router configuration: identity, direct links and the
/// directory used to address every router in the domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    pub router_id: RouterId,
    pub listen_port: u16,
    /// Direct neighbors and the cost of the link towards each of them.
    pub neighbors: HashMap<RouterId, u32>,
    /// Router id to UDP endpoint mapping for the whole domain.
    pub directory: HashMap<RouterId, RouterAddress>,
    #[serde(default = "default_flood_interval_ms")]
    pub flood_interval_ms: u64,
    /// When set, route recomputation is deferred until every configured
    /// neighbor has advertised at least once.
    #[serde(default)]
    pub wait_for_neighbors: bool,
    #[serde(default)]
    pub control_port: Option<u16>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            router_id: String::new(),
            listen_port: 0,
            neighbors: HashMap::new(),
            directory: HashMap::new(),
            flood_interval_ms: DEFAULT_FLOOD_INTERVAL_MS,
            wait_for_neighbors: false,
            control_port: None,
        }
    }
}

impl RouterConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: RouterConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// The advertisement this router floods: its identity plus the static
    /// neighbor costs. Built fresh for every cycle.
    pub fn own_packet(&self) -> LinkStatePacket {
        LinkStatePacket::new(self.router_id.clone(), self.neighbors.clone())
    }

    pub fn address_of(&self, router_id: &str) -> Option<&RouterAddress> {
        self.directory.get(router_id)
    }

    pub fn flood_interval(&self) -> Duration {
        Duration::from_millis(self.flood_interval_ms)
    }
}

/// Parses a neighbor list given as `R2=1,R3=3`. Empty entries are
/// tolerated so trailing commas do not fail the whole spec.
pub fn parse_neighbor_spec(spec: &str) -> Result<HashMap<RouterId, u32>> {
    let mut neighbors = HashMap::new();
    for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
        let Some((id, cost)) = entry.split_once('=') else {
            bail!("invalid neighbor entry '{}', expected ID=COST", entry);
        };
        let id = id.trim();
        if id.is_empty() {
            bail!("invalid neighbor entry '{}', empty router id", entry);
        }
        let cost: u32 = cost
            .trim()
            .parse()
            .with_context(|| format!("invalid cost in neighbor entry '{}'", entry))?;
        neighbors.insert(id.to_string(), cost);
    }
    Ok(neighbors)
}

/// Parses a directory given as `R1=hostA:5001,R2=10.0.0.2:5002`. The port
/// is split off the right so IPv6-style hosts with colons keep working.
pub fn parse_directory_spec(spec: &str) -> Result<HashMap<RouterId, RouterAddress>> {
    let mut directory = HashMap::new();
    for entry in spec.split(',').filter(|e| !e.trim().is_empty()) {
        let Some((id, endpoint)) = entry.split_once('=') else {
            bail!("invalid directory entry '{}', expected ID=HOST:PORT", entry);
        };
        let id = id.trim();
        if id.is_empty() {
            bail!("invalid directory entry '{}', empty router id", entry);
        }
        let Some((host, port)) = endpoint.rsplit_once(':') else {
            bail!("invalid directory entry '{}', expected ID=HOST:PORT", entry);
        };
        let host = host.trim();
        if host.is_empty() {
            bail!("invalid directory entry '{}', empty host", entry);
        }
        let port: u16 = port
            .trim()
            .parse()
            .with_context(|| format!("invalid port in directory entry '{}'", entry))?;
        directory.insert(id.to_string(), RouterAddress::new(host, port));
    }
    Ok(directory)
}
