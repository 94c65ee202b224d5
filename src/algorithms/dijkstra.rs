use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::RouterId;
use crate::packet::LinkStatePacket;
use crate::routing_table::Route;

#[derive(Debug)]
struct State {
    cost: u32,
    router: RouterId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other.cost.cmp(&self.cost)
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths over the graph the LSDB describes, reduced
/// to a destination → next-hop table.
///
/// Every LSDB entry is a node whose packet contributes directed, weighted
/// edges. A destination that so far appears only as an edge target (its own
/// packet has not arrived yet) is still routable: reachability is decided by
/// the links we know about, not by who we have heard from directly.
pub fn calculate_routes(
    source: &str,
    lsdb: &HashMap<RouterId, LinkStatePacket>,
) -> HashMap<RouterId, Route> {
    let mut distances: HashMap<RouterId, u32> = HashMap::new();
    let mut previous: HashMap<RouterId, RouterId> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for router_id in lsdb.keys() {
        distances.insert(router_id.clone(), u32::MAX);
    }
    distances.insert(source.to_string(), 0);

    heap.push(State {
        cost: 0,
        router: source.to_string(),
    });

    while let Some(State { cost, router }) = heap.pop() {
        // Skip if we've already found a better path
        if cost > distances.get(&router).copied().unwrap_or(u32::MAX) {
            continue;
        }

        // A router we only know as somebody's edge target advertises nothing.
        let Some(packet) = lsdb.get(&router) else {
            continue;
        };

        for (neighbor, link_cost) in &packet.neighbors {
            let next_cost = cost.saturating_add(*link_cost);

            if next_cost < distances.get(neighbor).copied().unwrap_or(u32::MAX) {
                distances.insert(neighbor.clone(), next_cost);
                previous.insert(neighbor.clone(), router.clone());
                heap.push(State {
                    cost: next_cost,
                    router: neighbor.clone(),
                });
            }
        }
    }

    let mut routes = HashMap::new();
    for (destination, &cost) in &distances {
        if destination == source || cost == u32::MAX {
            continue;
        }
        if let Some(next_hop) = find_next_hop(&previous, source, destination) {
            routes.insert(destination.clone(), Route { next_hop, cost });
        }
    }

    routes
}

/// Walk the predecessor chain backward from `dest` until it reaches
/// `source`; the router standing right before `source` is the next hop.
/// A dead end means the destination is unreachable and yields no hop.
fn find_next_hop(
    previous: &HashMap<RouterId, RouterId>,
    source: &str,
    dest: &str,
) -> Option<RouterId> {
    let mut current = dest;

    // The longest possible chain visits each router once; anything beyond
    // that is a corrupt predecessor map and must not hang the router.
    for _ in 0..=previous.len() {
        let prev = previous.get(current)?;
        if prev == source {
            return Some(current.to_string());
        }
        current = prev;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lsdb(entries: &[(&str, &[(&str, u32)])]) -> HashMap<RouterId, LinkStatePacket> {
        entries
            .iter()
            .map(|(origin, links)| {
                let neighbors = links.iter().map(|(id, c)| (id.to_string(), *c)).collect();
                (
                    origin.to_string(),
                    LinkStatePacket::new(origin.to_string(), neighbors),
                )
            })
            .collect()
    }

    #[test]
    fn test_line_topology_with_full_knowledge() {
        // R1 --1-- R2 --1-- R3
        let db = lsdb(&[
            ("R1", &[("R2", 1)]),
            ("R2", &[("R1", 1), ("R3", 1)]),
            ("R3", &[("R2", 1)]),
        ]);

        let from_mid = calculate_routes("R2", &db);
        assert_eq!(from_mid["R1"].next_hop, "R1");
        assert_eq!(from_mid["R3"].next_hop, "R3");
        assert_eq!(from_mid.len(), 2);

        let from_end = calculate_routes("R1", &db);
        assert_eq!(from_end["R2"].next_hop, "R2");
        assert_eq!(from_end["R3"].next_hop, "R2");
        assert_eq!(from_end["R3"].cost, 2);
    }

    #[test]
    fn test_destination_known_only_as_edge_target_is_routable() {
        // R1 has heard from R2 but never from R3; R2's packet still
        // advertises the R2->R3 link, so R3 is reachable through it.
        let db = lsdb(&[("R1", &[("R2", 1)]), ("R2", &[("R1", 1), ("R3", 1)])]);

        let routes = calculate_routes("R1", &db);
        assert_eq!(routes["R2"].next_hop, "R2");
        assert_eq!(routes["R3"].next_hop, "R2");
        assert_eq!(routes["R3"].cost, 2);
    }

    #[test]
    fn test_direct_neighbor_without_own_packet_is_routable() {
        let db = lsdb(&[("R1", &[("R2", 5)])]);
        let routes = calculate_routes("R1", &db);
        assert_eq!(routes["R2"].next_hop, "R2");
        assert_eq!(routes["R2"].cost, 5);
    }

    #[test]
    fn test_star_topology_routes_leaves_through_center() {
        // Leaves R2, R3, R4 all attach to center R1 at cost 1.
        let db = lsdb(&[
            ("R1", &[("R2", 1), ("R3", 1), ("R4", 1)]),
            ("R2", &[("R1", 1)]),
            ("R3", &[("R1", 1)]),
            ("R4", &[("R1", 1)]),
        ]);

        let from_center = calculate_routes("R1", &db);
        for leaf in ["R2", "R3", "R4"] {
            assert_eq!(from_center[leaf].next_hop, leaf);
            assert_eq!(from_center[leaf].cost, 1);
        }

        let from_leaf = calculate_routes("R2", &db);
        assert_eq!(from_leaf["R1"].next_hop, "R1");
        assert_eq!(from_leaf["R3"].next_hop, "R1");
        assert_eq!(from_leaf["R4"].next_hop, "R1");
        assert_eq!(from_leaf["R3"].cost, 2);
    }

    #[test]
    fn test_distances_match_reference_graph() {
        // A --1-- B --2-- C --3-- D, plus the slow direct links A--4--C
        // and B--6--D. Shortest from A: B=1, C=3, D=6, all entered via B.
        let db = lsdb(&[
            ("A", &[("B", 1), ("C", 4)]),
            ("B", &[("A", 1), ("C", 2), ("D", 6)]),
            ("C", &[("A", 4), ("B", 2), ("D", 3)]),
            ("D", &[("B", 6), ("C", 3)]),
        ]);

        let routes = calculate_routes("A", &db);
        assert_eq!(routes["B"].cost, 1);
        assert_eq!(routes["C"].cost, 3);
        assert_eq!(routes["D"].cost, 6);
        for dest in ["B", "C", "D"] {
            assert_eq!(routes[dest].next_hop, "B");
        }
    }

    #[test]
    fn test_equal_cost_paths_pick_one_valid_next_hop() {
        // Diamond with two cost-2 paths A->B->D and A->C->D. Either first
        // hop is a correct answer; which one wins is not pinned down.
        let db = lsdb(&[
            ("A", &[("B", 1), ("C", 1)]),
            ("B", &[("A", 1), ("D", 1)]),
            ("C", &[("A", 1), ("D", 1)]),
            ("D", &[("B", 1), ("C", 1)]),
        ]);

        let routes = calculate_routes("A", &db);
        assert_eq!(routes["D"].cost, 2);
        assert!(routes["D"].next_hop == "B" || routes["D"].next_hop == "C");
    }

    #[test]
    fn test_source_never_appears_in_table() {
        let db = lsdb(&[
            ("R1", &[("R2", 1)]),
            ("R2", &[("R1", 1)]),
        ]);
        assert!(!calculate_routes("R1", &db).contains_key("R1"));
        assert!(!calculate_routes("R2", &db).contains_key("R2"));
    }

    #[test]
    fn test_unreachable_destinations_are_omitted() {
        // X points at A but nothing points at X; I is fully isolated.
        let db = lsdb(&[
            ("A", &[("B", 1)]),
            ("B", &[("A", 1)]),
            ("X", &[("A", 2)]),
            ("I", &[]),
        ]);

        let routes = calculate_routes("A", &db);
        assert_eq!(routes.len(), 1);
        assert!(routes.contains_key("B"));
        assert!(!routes.contains_key("X"));
        assert!(!routes.contains_key("I"));

        // From X everything is reachable, the links are directed.
        let routes = calculate_routes("X", &db);
        assert_eq!(routes["A"].next_hop, "A");
        assert_eq!(routes["B"].next_hop, "A");
    }

    #[test]
    fn test_asymmetric_costs_respect_edge_direction() {
        let db = lsdb(&[("A", &[("B", 10)]), ("B", &[("A", 1)])]);
        assert_eq!(calculate_routes("A", &db)["B"].cost, 10);
        assert_eq!(calculate_routes("B", &db)["A"].cost, 1);
    }

    #[test]
    fn test_zero_cost_links_are_traversable() {
        let db = lsdb(&[
            ("A", &[("B", 0)]),
            ("B", &[("A", 0), ("C", 0)]),
            ("C", &[("B", 0)]),
        ]);
        let routes = calculate_routes("A", &db);
        assert_eq!(routes["C"].next_hop, "B");
        assert_eq!(routes["C"].cost, 0);
    }

    #[test]
    fn test_self_loop_in_advertisement_is_harmless() {
        let db = lsdb(&[("A", &[("A", 3), ("B", 1)]), ("B", &[("A", 1)])]);
        let routes = calculate_routes("A", &db);
        assert!(!routes.contains_key("A"));
        assert_eq!(routes["B"].next_hop, "B");
    }

    #[test]
    fn test_lonely_source_yields_empty_table() {
        let db = lsdb(&[("A", &[])]);
        assert!(calculate_routes("A", &db).is_empty());
    }

    #[test]
    fn test_next_hop_walk_survives_corrupt_predecessor_cycle() {
        let mut previous = HashMap::new();
        previous.insert("A".to_string(), "B".to_string());
        previous.insert("B".to_string(), "A".to_string());
        assert_eq!(find_next_hop(&previous, "S", "A"), None);
    }

    #[test]
    fn test_next_hop_walk_dead_end_yields_none() {
        let mut previous = HashMap::new();
        previous.insert("C".to_string(), "B".to_string());
        assert_eq!(find_next_hop(&previous, "S", "C"), None);
    }
}
