use std::collections::HashMap;

use crate::RouterId;
use crate::packet::LinkStatePacket;

/// Store of the most recent advertisement heard from every known router,
/// keyed by origin. Seeded with the owning router's packet at startup.
/// Every received packet replaces whatever was there before; nothing is
/// removed and nothing tracks age; last received wins.
#[derive(Debug, Clone)]
pub struct LinkStateDatabase {
    entries: HashMap<RouterId, LinkStatePacket>,
}

impl LinkStateDatabase {
    pub fn new(own_packet: LinkStatePacket) -> Self {
        let mut entries = HashMap::new();
        entries.insert(own_packet.router_id.clone(), own_packet);
        Self { entries }
    }

    /// Insert or replace the entry for the packet's origin, unconditionally.
    pub fn put(&mut self, packet: LinkStatePacket) {
        self.entries.insert(packet.router_id.clone(), packet);
    }

    pub fn get(&self, router_id: &str) -> Option<&LinkStatePacket> {
        self.entries.get(router_id)
    }

    pub fn contains(&self, router_id: &str) -> bool {
        self.entries.contains_key(router_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The full origin → packet mapping, for the solver and the control
    /// endpoint. Callers hold the state lock while using it, which is what
    /// makes the borrow a consistent snapshot.
    pub fn snapshot(&self) -> &HashMap<RouterId, LinkStatePacket> {
        &self.entries
    }
}
