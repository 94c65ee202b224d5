use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::RouterId;

/// One router's advertisement: its identity and its direct neighbors with
/// link costs. This is the only message the protocol exchanges; one UDP
/// datagram carries exactly one packet.
///
/// The neighbor map is taken verbatim from the origin's static configuration
/// and is never merged with or derived from other routers' packets. Zero
/// costs, self-loops and entries for routers nobody has heard from are all
/// accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStatePacket {
    pub router_id: RouterId,
    pub neighbors: HashMap<RouterId, u32>,
}

impl LinkStatePacket {
    pub fn new(router_id: RouterId, neighbors: HashMap<RouterId, u32>) -> Self {
        Self {
            router_id,
            neighbors,
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
