use std::collections::HashSet;

use crate::config::OverlayConfig;
use crate::graph::Graph;
use crate::traversal::connected_node_ids;

use super::{Composition, EdgeVisual, NodeVisual};

/// Transient emphasis around a hovered node.
///
/// Built once when the hover target changes; [`HoverOverlay::apply`] is cheap enough to run
/// every frame against the current base composition.
#[derive(Clone, Debug)]
pub struct HoverOverlay {
    node: usize,
    neighbors: HashSet<usize>,
}

impl HoverOverlay {
    pub fn new(graph: &Graph, node: usize) -> Option<Self> {
        let id = &graph.nodes().get(node)?.id;
        let neighbors = connected_node_ids(id, graph.edges(), 1)
            .iter()
            .filter_map(|id| graph.index_of(id))
            .collect();
        Some(Self { node, neighbors })
    }

    pub fn node(&self) -> usize {
        self.node
    }

    pub fn contains(&self, index: usize) -> bool {
        self.neighbors.contains(&index)
    }

    /// Returns `base` with the hovered neighborhood raised to full opacity and everything
    /// else capped at the configured dim level. Elements excluded from `base` stay excluded,
    /// and a hover over an excluded node changes nothing.
    pub fn apply(&self, base: &Composition, graph: &Graph, overlay: &OverlayConfig) -> Composition {
        if base.node(self.node).is_none() {
            return base.clone();
        }

        let nodes = base
            .nodes
            .iter()
            .enumerate()
            .map(|(index, visual)| {
                visual.map(|visual| {
                    if self.neighbors.contains(&index) {
                        NodeVisual {
                            opacity: 1.0,
                            highlighted: true,
                            ..visual
                        }
                    } else {
                        NodeVisual {
                            opacity: visual.opacity.min(overlay.hover_node_opacity),
                            ..visual
                        }
                    }
                })
            })
            .collect();

        let edges = base
            .edges
            .iter()
            .zip(graph.endpoints())
            .map(|(visual, &(source, target))| {
                visual.map(|visual| {
                    if source == self.node || target == self.node {
                        EdgeVisual {
                            opacity: 1.0,
                            highlighted: true,
                        }
                    } else {
                        EdgeVisual {
                            opacity: visual.opacity.min(overlay.hover_edge_opacity),
                            ..visual
                        }
                    }
                })
            })
            .collect();

        Composition { nodes, edges }
    }
}
