use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::RouterId;

/// A single forwarding decision: hand traffic for a destination to
/// `next_hop`, reaching it at total shortest-path cost `cost`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub next_hop: RouterId,
    pub cost: u32,
}

/// Destination → next-hop table derived from the LSDB. Replaced wholesale on
/// every recomputation, never patched in place. Holds no entry for the local
/// router and none for destinations without a known path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingTable {
    routes: HashMap<RouterId, Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Drop the previous table and install the freshly computed one.
    pub fn replace(&mut self, routes: HashMap<RouterId, Route>) {
        self.routes = routes;
    }

    pub fn get(&self, destination: &str) -> Option<&Route> {
        self.routes.get(destination)
    }

    pub fn next_hop(&self, destination: &str) -> Option<&RouterId> {
        self.routes.get(destination).map(|route| &route.next_hop)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RouterId, &Route)> {
        self.routes.iter()
    }
}

impl fmt::Display for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.routes.iter().collect();
        entries.sort_by_key(|(destination, _)| destination.as_str());

        write!(f, "{{")?;
        for (i, (destination, route)) in entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} -> {} ({})", destination, route.next_hop, route.cost)?;
        }
        write!(f, "}}")
    }
}
