//! Id-indexed graph snapshot built from collaborator payloads.
//!
//! A [`Graph`] is an arena: nodes live in a `Vec` and are addressed by their position in it,
//! with `index_by_id` mapping string ids back to slots. Edges keep the ids they arrived with
//! and a parallel table of resolved endpoint indices. Node positions are not stored here; the
//! layout simulation owns them.

mod normalize;
pub mod payload;
pub mod search;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use normalize::normalize;
pub use payload::{GraphMetadata, GraphPayload, PathPayload, RawEdge, RawNode, RoadmapPayload};

/// Category of a node. Unknown categories are preserved verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    User,
    Skill,
    Community,
    Event,
    Project,
    Company,
    Search,
    Other(String),
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Skill => "skill",
            Self::Community => "community",
            Self::Event => "event",
            Self::Project => "project",
            Self::Company => "company",
            Self::Search => "search",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Default palette color, used unless the node carries its own override.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::User => [0x09, 0x69, 0xda],
            Self::Skill => [0x2d, 0xa4, 0x4e],
            Self::Community => [0x82, 0x50, 0xdf],
            Self::Event => [0xbf, 0x87, 0x00],
            Self::Project => [0xcf, 0x22, 0x2e],
            Self::Company => [0x57, 0x60, 0x6a],
            Self::Search => [0x0a, 0x30, 0x69],
            Self::Other(_) => [0x8c, 0x95, 0x9f],
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "user" => Self::User,
            "skill" => Self::Skill,
            "community" => Self::Community,
            "event" => Self::Event,
            "project" => Self::Project,
            "company" => Self::Company,
            "search" => Self::Search,
            _ => Self::Other(value),
        }
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub kind: NodeType,
    pub label: String,
    /// Size/weight hint from the payload; drives the rendered radius.
    pub size: Option<f32>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub cluster: Option<u32>,
    /// Clamped to `[0, 1]` during normalization.
    pub centrality: Option<f32>,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    pub fn display_color(&self) -> [u8; 3] {
        self.color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or_else(|| self.kind.color())
    }
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub kind: String,
    /// Strength in `[0, 1]`; higher weight shortens the spring rest length.
    pub weight: Option<f32>,
    pub label: Option<String>,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    /// Whether this edge joins `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    pub fn other_end(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(self.target.as_str())
        } else if self.target == id {
            Some(self.source.as_str())
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterInfo {
    pub id: u32,
    pub label: String,
    pub color: Option<String>,
    pub dominant_type: Option<NodeType>,
    pub top_skills: Vec<String>,
    /// Member count as reported by the payload, or the listed members when it reports none.
    pub size: usize,
}

const CLUSTER_PALETTE: [&str; 10] = [
    "#0969da", "#2da44e", "#8250df", "#bf8700", "#cf222e", "#0550ae", "#1a7f37", "#6639ba",
    "#9a6700", "#a40e26",
];

pub fn cluster_palette_color(cluster: u32) -> [u8; 3] {
    let hex = CLUSTER_PALETTE[cluster as usize % CLUSTER_PALETTE.len()];
    parse_hex_color(hex).unwrap_or([128, 128, 128])
}

pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    endpoints: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    clusters: Vec<ClusterInfo>,
    metadata: GraphMetadata,
}

impl Graph {
    pub fn from_payload(payload: GraphPayload) -> Self {
        let GraphPayload {
            nodes,
            edges,
            metadata,
            clusters,
        } = payload;

        let mut graph = normalize(nodes, edges);
        graph.metadata = metadata;

        // Cluster listings may name members whose node rows carry no cluster field.
        for cluster in &clusters {
            for id in &cluster.node_ids {
                if let Some(&index) = graph.index_by_id.get(id) {
                    graph.nodes[index].cluster.get_or_insert(cluster.id);
                }
            }
        }

        graph.clusters = clusters
            .into_iter()
            .map(|cluster| ClusterInfo {
                size: match cluster.size {
                    0 => cluster.node_ids.len(),
                    size => size,
                },
                id: cluster.id,
                label: cluster.label,
                color: cluster.color,
                dominant_type: cluster.dominant_type,
                top_skills: cluster.top_skills,
            })
            .collect();
        graph
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Resolved `(source, target)` node indices, parallel to [`Graph::edges`].
    pub fn endpoints(&self) -> &[(usize, usize)] {
        &self.endpoints
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn cluster_info(&self, cluster: u32) -> Option<&ClusterInfo> {
        self.clusters.iter().find(|info| info.id == cluster)
    }

    pub fn cluster_color(&self, cluster: u32) -> [u8; 3] {
        self.cluster_info(cluster)
            .and_then(|info| info.color.as_deref())
            .and_then(parse_hex_color)
            .unwrap_or_else(|| cluster_palette_color(cluster))
    }
}
