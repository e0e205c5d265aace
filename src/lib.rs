#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod minimap;
pub mod physics;
pub mod traversal;
pub mod view;

pub use config::EngineConfig;
pub use engine::{Frame, GraphEngine};
pub use error::{Error, Result};
pub use graph::{Edge, Graph, GraphPayload, Node, NodeType};
pub use traversal::{PathResult, connected_node_ids, distances_from, shortest_path};
pub use view::{ClusterAlgorithm, ViewState};
