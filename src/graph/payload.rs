use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::traversal::{PathEdge, PathResult};

use super::NodeType;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub metadata: GraphMetadata,
    #[serde(default)]
    pub clusters: Vec<ClusterPayload>,
}

impl GraphPayload {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub cluster: Option<u32>,
    #[serde(default)]
    pub centrality: Option<f32>,
}

/// An edge endpoint as sent by the collaborator: a bare id or an embedded node object.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum EndpointRef {
    Id(String),
    Number(u64),
    Node { id: String },
}

impl EndpointRef {
    pub fn id(&self) -> String {
        match self {
            Self::Id(id) | Self::Node { id } => id.clone(),
            Self::Number(id) => id.to_string(),
        }
    }
}

impl From<&str> for EndpointRef {
    fn from(value: &str) -> Self {
        Self::Id(value.to_owned())
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
    #[serde(default)]
    pub id: Option<String>,
    pub source: EndpointRef,
    pub target: EndpointRef,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphMetadata {
    #[serde(default)]
    pub center_node: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub total_nodes: usize,
    #[serde(default)]
    pub total_edges: usize,
    #[serde(default)]
    pub view_type: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ClusterPayload {
    pub id: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub node_ids: Vec<String>,
    #[serde(default)]
    pub dominant_type: Option<NodeType>,
    #[serde(default)]
    pub top_skills: Vec<String>,
    #[serde(default)]
    pub size: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PathNodePayload {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeType,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PathEdgePayload {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
}

/// Path-query response computed upstream.
#[derive(Clone, Debug, Deserialize)]
pub struct PathPayload {
    pub found: bool,
    #[serde(default)]
    pub path: Vec<PathNodePayload>,
    #[serde(default)]
    pub edges: Vec<PathEdgePayload>,
    #[serde(default)]
    pub length: usize,
    #[serde(default, alias = "relationshipTypes")]
    pub relationship_types: Vec<String>,
}

impl PathPayload {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl From<PathPayload> for PathResult {
    fn from(payload: PathPayload) -> Self {
        if !payload.found {
            return PathResult::not_found();
        }

        PathResult {
            found: true,
            nodes: payload.path.into_iter().map(|node| node.id).collect(),
            edges: payload
                .edges
                .into_iter()
                .map(|edge| PathEdge {
                    label: edge
                        .label
                        .unwrap_or_else(|| crate::traversal::humanize_relation(&edge.kind)),
                    source: edge.source,
                    target: edge.target,
                    kind: edge.kind,
                })
                .collect(),
            relation_types: payload.relationship_types,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RoadmapSkillPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default)]
    pub is_target: bool,
}

/// Skill roadmap bundle; its `graph` is loaded like any other graph payload.
#[derive(Clone, Debug, Deserialize)]
pub struct RoadmapPayload {
    pub target_skill: String,
    #[serde(default)]
    pub current_skills: Vec<String>,
    #[serde(default)]
    pub path: Vec<RoadmapSkillPayload>,
    pub graph: GraphPayload,
}
