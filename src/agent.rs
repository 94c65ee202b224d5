use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::algorithms::dijkstra;
use crate::config::RouterConfig;
use crate::packet::LinkStatePacket;
use crate::{RouterState, SharedRouterState};

const MAX_DATAGRAM_SIZE: usize = 4096;

/// One router process: a periodic flooder advertising the local links and
/// a listener folding received advertisements into the shared state.
pub struct RouterAgent {
    config: Arc<RouterConfig>,
    state: SharedRouterState,
    socket: Arc<UdpSocket>,
}

impl RouterAgent {
    /// Wraps an already bound socket. Callers that need to know the port
    /// before building the directory (tests bind on port 0) use this.
    pub fn new(config: RouterConfig, socket: UdpSocket) -> Self {
        let state = Arc::new(RwLock::new(RouterState::new(config.own_packet())));
        Self {
            config: Arc::new(config),
            state,
            socket: Arc::new(socket),
        }
    }

    pub async fn bind(config: RouterConfig) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", config.listen_port))
            .await
            .with_context(|| format!("failed to bind UDP port {}", config.listen_port))?;
        Ok(Self::new(config, socket))
    }

    pub fn state(&self) -> SharedRouterState {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> Arc<RouterConfig> {
        Arc::clone(&self.config)
    }

    /// Spawns the flooder and runs the listener in the current task. Only
    /// ever returns on a socket setup error.
    pub async fn start(self) -> Result<()> {
        let local_addr = self.socket.local_addr()?;
        info!(
            "router {} listening on {}, flooding every {:?} to {} neighbors",
            self.config.router_id,
            local_addr,
            self.config.flood_interval(),
            self.config.neighbors.len()
        );

        // The flooder sends from its own ephemeral socket; the fixed port
        // stays dedicated to receiving.
        let send_socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("failed to bind flooder send socket")?;
        tokio::spawn(flood_loop(Arc::clone(&self.config), Arc::new(send_socket)));

        self.receive_loop().await
    }

    async fn receive_loop(&self) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, from)) => self.handle_datagram(&buf[..len], from).await,
                Err(e) => {
                    error!("failed to receive datagram: {}", e);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }

    async fn handle_datagram(&self, data: &[u8], from: SocketAddr) {
        match LinkStatePacket::deserialize(data) {
            Ok(packet) => {
                debug!(
                    "received advertisement from {} originated by {}",
                    from, packet.router_id
                );
                self.handle_packet(packet).await;
            }
            Err(e) => {
                warn!("discarding malformed datagram from {}: {}", from, e);
            }
        }
    }

    /// Stores the advertisement and recomputes routes under a single write
    /// lock, so readers never observe a database newer than the table by
    /// more than one packet.
    async fn handle_packet(&self, packet: LinkStatePacket) {
        let mut state = self.state.write().await;
        state.lsdb.put(packet);

        if self.config.wait_for_neighbors {
            let known = self
                .config
                .neighbors
                .keys()
                .filter(|n| state.lsdb.contains(n))
                .count();
            if known < self.config.neighbors.len() {
                info!(
                    "deferring route recomputation, {}/{} neighbors advertised",
                    known,
                    self.config.neighbors.len()
                );
                return;
            }
        }

        let routes = dijkstra::calculate_routes(&self.config.router_id, state.lsdb.snapshot());
        state.routing_table.replace(routes);
        info!(
            "routing table for {} recomputed: {}",
            self.config.router_id, state.routing_table
        );
    }
}

/// Rebuilds and sends the local advertisement to every neighbor on a fixed
/// cadence. `interval` schedules against the start time, so the cycle does
/// not drift by the time spent sending.
async fn flood_loop(config: Arc<RouterConfig>, socket: Arc<UdpSocket>) {
    let mut ticker = interval(config.flood_interval());
    loop {
        ticker.tick().await;

        let packet = config.own_packet();
        let payload = match packet.serialize() {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to serialize own advertisement: {}", e);
                continue;
            }
        };

        for neighbor_id in config.neighbors.keys() {
            let Some(address) = config.address_of(neighbor_id) else {
                warn!("no directory entry for neighbor {}, skipping", neighbor_id);
                continue;
            };
            if let Err(e) = socket.send_to(&payload, address.endpoint()).await {
                warn!(
                    "failed to send advertisement to {} at {}:{}: {}",
                    neighbor_id, address.host, address.port, e
                );
            }
        }
        debug!(
            "flooded advertisement for {} ({} neighbors)",
            config.router_id,
            config.neighbors.len()
        );
    }
}
