pub mod packet;
pub mod lsdb;
pub mod algorithms;
pub mod routing_table;
pub mod config;
pub mod agent;
pub mod control;

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::lsdb::LinkStateDatabase;
use crate::packet::LinkStatePacket;
use crate::routing_table::RoutingTable;

pub type RouterId = String;

/// The mutable half of a router: everything the listener rewrites and the
/// control endpoint reads. Always accessed through [`SharedRouterState`] so
/// an LSDB update and the routing-table replacement that follows it are
/// observed as one step.
#[derive(Debug, Clone)]
pub struct RouterState {
    pub lsdb: LinkStateDatabase,
    pub routing_table: RoutingTable,
}

impl RouterState {
    pub fn new(own_packet: LinkStatePacket) -> Self {
        Self {
            lsdb: LinkStateDatabase::new(own_packet),
            routing_table: RoutingTable::new(),
        }
    }
}

pub type SharedRouterState = Arc<RwLock<RouterState>>;
