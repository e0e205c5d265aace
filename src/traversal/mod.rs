//! Breadth-first queries over an edge list.
//!
//! Every query treats edges as undirected and rebuilds its adjacency from the slice it is
//! given; nothing is cached between calls. Callers run these on discrete interactions and
//! hold on to the result for the rest of that interaction.

mod collect;
mod paths;

use std::collections::HashMap;

use crate::graph::Edge;

pub use collect::{connected_node_ids, distances_from};
pub use paths::{PathEdge, PathResult, humanize_relation, shortest_path};

/// Neighbor lists in edge order; each entry carries the index of the edge that produced it.
fn adjacency(edges: &[Edge]) -> HashMap<&str, Vec<(&str, usize)>> {
    let mut adjacency: HashMap<&str, Vec<(&str, usize)>> = HashMap::new();
    for (index, edge) in edges.iter().enumerate() {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push((edge.target.as_str(), index));
        if edge.source != edge.target {
            adjacency
                .entry(edge.target.as_str())
                .or_default()
                .push((edge.source.as_str(), index));
        }
    }
    adjacency
}
