use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::Edge;

use super::adjacency;

/// Ids within `depth` hops of `start`, including `start` itself.
pub fn connected_node_ids(start: &str, edges: &[Edge], depth: usize) -> HashSet<String> {
    let adjacency = adjacency(edges);
    let mut queue = VecDeque::from([(start, 0usize)]);
    let mut visited = HashSet::from([start]);

    while let Some((node_id, hops)) = queue.pop_front() {
        if hops >= depth {
            continue;
        }

        let Some(neighbors) = adjacency.get(node_id) else {
            continue;
        };

        for &(next_id, _) in neighbors {
            if visited.insert(next_id) {
                queue.push_back((next_id, hops + 1));
            }
        }
    }

    visited.into_iter().map(str::to_owned).collect()
}

/// Hop count from `start` to every reachable node. Unreachable nodes are absent.
pub fn distances_from(start: &str, edges: &[Edge]) -> HashMap<String, usize> {
    let adjacency = adjacency(edges);
    let mut distances = HashMap::from([(start, 0usize)]);
    let mut queue = VecDeque::from([start]);

    while let Some(node_id) = queue.pop_front() {
        let hops = distances[node_id];
        let Some(neighbors) = adjacency.get(node_id) else {
            continue;
        };

        for &(next_id, _) in neighbors {
            if !distances.contains_key(next_id) {
                distances.insert(next_id, hops + 1);
                queue.push_back(next_id);
            }
        }
    }

    distances
        .into_iter()
        .map(|(id, hops)| (id.to_owned(), hops))
        .collect()
}
