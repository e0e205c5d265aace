use std::collections::HashMap;

use tracing::{debug, warn};

use super::payload::{RawEdge, RawNode};
use super::{Edge, Graph, Node};

/// Builds an id-indexed graph from raw payload rows.
///
/// Edges whose source or target is missing from `raw_nodes` are dropped. Upstream filters
/// routinely trim nodes without trimming their edges, so this is logged at debug level only.
/// A repeated node id keeps its first occurrence.
pub fn normalize(raw_nodes: Vec<RawNode>, raw_edges: Vec<RawEdge>) -> Graph {
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    let mut index_by_id = HashMap::with_capacity(raw_nodes.len());

    for raw in raw_nodes {
        if index_by_id.contains_key(&raw.id) {
            warn!(id = %raw.id, "duplicate node id in payload; keeping first occurrence");
            continue;
        }

        index_by_id.insert(raw.id.clone(), nodes.len());
        nodes.push(Node {
            id: raw.id,
            kind: raw.kind,
            label: raw.label,
            size: raw.size.filter(|size| size.is_finite() && *size >= 0.0),
            color: raw.color,
            image_url: raw.image_url,
            cluster: raw.cluster,
            centrality: raw
                .centrality
                .filter(|value| value.is_finite())
                .map(|value| value.clamp(0.0, 1.0)),
            properties: raw.properties,
        });
    }

    let raw_edge_count = raw_edges.len();
    let mut edges = Vec::with_capacity(raw_edge_count);
    let mut endpoints = Vec::with_capacity(raw_edge_count);

    for raw in raw_edges {
        let source = raw.source.id();
        let target = raw.target.id();
        let (Some(&source_index), Some(&target_index)) =
            (index_by_id.get(&source), index_by_id.get(&target))
        else {
            continue;
        };

        endpoints.push((source_index, target_index));
        edges.push(Edge {
            id: raw.id,
            source,
            target,
            kind: raw.kind,
            weight: raw
                .weight
                .filter(|weight| weight.is_finite())
                .map(|weight| weight.clamp(0.0, 1.0)),
            label: raw.label,
        });
    }

    let dropped = raw_edge_count - edges.len();
    if dropped > 0 {
        debug!(dropped, "dropped edges with unresolved endpoints");
    }

    Graph {
        nodes,
        edges,
        endpoints,
        index_by_id,
        ..Graph::default()
    }
}
