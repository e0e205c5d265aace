//! Per-element visual attributes derived from the active view mode.
//!
//! Composition is layered: [`compose`] turns a [`ViewState`] into a base [`Composition`],
//! and a transient [`HoverOverlay`] is applied on top of that base each frame without
//! modifying it. Ending a hover simply stops applying the overlay.

mod hover;

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::config::OverlayConfig;
use crate::graph::Graph;
use crate::traversal::{PathResult, connected_node_ids, distances_from};

pub use hover::HoverOverlay;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterAlgorithm {
    #[default]
    Louvain,
    #[serde(rename = "kmeans")]
    KMeans,
    SkillBased,
}

impl ClusterAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Louvain => "louvain",
            Self::KMeans => "kmeans",
            Self::SkillBased => "skill_based",
        }
    }
}

/// Exactly one mode is active at a time; each variant carries only its own parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViewState {
    #[default]
    Full,
    Local {
        focus: String,
        depth: usize,
        fade: bool,
    },
    Path {
        source: String,
        target: String,
        highlight: bool,
    },
    Cluster {
        algorithm: ClusterAlgorithm,
        min_size: usize,
        show_hulls: bool,
    },
    Search {
        query: String,
    },
}

impl ViewState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Local { .. } => "local",
            Self::Path { .. } => "path",
            Self::Cluster { .. } => "cluster",
            Self::Search { .. } => "search",
        }
    }

    /// Minimum member count for hull rendering, or `None` when hulls are off.
    pub fn hull_min_size(&self) -> Option<usize> {
        match self {
            Self::Cluster {
                min_size,
                show_hulls: true,
                ..
            } => Some(*min_size),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisual {
    pub opacity: f32,
    pub highlighted: bool,
    pub is_focus: bool,
}

impl NodeVisual {
    const PLAIN: Self = Self {
        opacity: 1.0,
        highlighted: false,
        is_focus: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVisual {
    pub opacity: f32,
    pub highlighted: bool,
}

impl EdgeVisual {
    const PLAIN: Self = Self {
        opacity: 1.0,
        highlighted: false,
    };
}

/// Visuals indexed like the graph's node and edge arenas. `None` means the element is not
/// part of the rendered set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composition {
    pub nodes: Vec<Option<NodeVisual>>,
    pub edges: Vec<Option<EdgeVisual>>,
}

impl Composition {
    pub fn full(graph: &Graph) -> Self {
        Self {
            nodes: vec![Some(NodeVisual::PLAIN); graph.node_count()],
            edges: vec![Some(EdgeVisual::PLAIN); graph.edge_count()],
        }
    }

    pub fn node(&self, index: usize) -> Option<NodeVisual> {
        self.nodes.get(index).copied().flatten()
    }

    pub fn edge(&self, index: usize) -> Option<EdgeVisual> {
        self.edges.get(index).copied().flatten()
    }

    pub fn rendered_node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn rendered_edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Drops edges whose endpoints are not both rendered and derives the remaining edge
    /// opacities from their endpoints.
    fn derive_edges(&mut self, graph: &Graph) {
        for (slot, &(source, target)) in self.edges.iter_mut().zip(graph.endpoints()) {
            *slot = match (self.nodes[source], self.nodes[target]) {
                (Some(from), Some(to)) => Some(EdgeVisual {
                    opacity: from.opacity.min(to.opacity),
                    highlighted: false,
                }),
                _ => None,
            };
        }
    }
}

/// Opacity of a node `distance` hops from the focus in a faded local view.
pub fn local_fade_opacity(distance: Option<usize>, depth: usize, floor: f32) -> f32 {
    match distance {
        Some(distance) if distance <= depth => {
            1.0 - (distance as f32 / (depth as f32 + 2.0)) * 0.5
        }
        _ => floor,
    }
}

/// Base visuals for `view`. `path` is the result to display in path mode.
pub fn compose(
    graph: &Graph,
    view: &ViewState,
    path: Option<&PathResult>,
    overlay: &OverlayConfig,
) -> Composition {
    match view {
        ViewState::Full | ViewState::Cluster { .. } | ViewState::Search { .. } => {
            Composition::full(graph)
        }
        ViewState::Local { focus, depth, fade } => {
            compose_local(graph, focus, *depth, *fade, overlay)
        }
        ViewState::Path {
            source,
            target,
            highlight,
        } => compose_path(graph, source, target, *highlight, path, overlay),
    }
}

fn compose_local(
    graph: &Graph,
    focus: &str,
    depth: usize,
    fade: bool,
    overlay: &OverlayConfig,
) -> Composition {
    let Some(focus_index) = graph.index_of(focus) else {
        debug!(focus, "local view focus is not in the graph; showing everything");
        return Composition::full(graph);
    };

    let mut composition = Composition::full(graph);
    if fade {
        let distances = distances_from(focus, graph.edges());
        for (node, slot) in graph.nodes().iter().zip(composition.nodes.iter_mut()) {
            let distance = distances.get(&node.id).copied();
            *slot = Some(NodeVisual {
                opacity: local_fade_opacity(distance, depth, overlay.local_fade_floor),
                ..NodeVisual::PLAIN
            });
        }
    } else {
        let members = connected_node_ids(focus, graph.edges(), depth);
        for (node, slot) in graph.nodes().iter().zip(composition.nodes.iter_mut()) {
            if !members.contains(&node.id) {
                *slot = None;
            }
        }
    }

    if let Some(Some(visual)) = composition.nodes.get_mut(focus_index) {
        visual.is_focus = true;
        visual.highlighted = true;
    }
    composition.derive_edges(graph);
    composition
}

fn compose_path(
    graph: &Graph,
    source: &str,
    target: &str,
    highlight: bool,
    path: Option<&PathResult>,
    overlay: &OverlayConfig,
) -> Composition {
    let mut composition = Composition::full(graph);
    for endpoint in [source, target] {
        if let Some(Some(visual)) = graph
            .index_of(endpoint)
            .and_then(|index| composition.nodes.get_mut(index))
        {
            visual.is_focus = true;
        }
    }

    let Some(path) = path.filter(|path| path.found && highlight) else {
        return composition;
    };

    let on_path = path.nodes.iter().map(String::as_str).collect::<HashSet<_>>();
    for (node, slot) in graph.nodes().iter().zip(composition.nodes.iter_mut()) {
        if let Some(visual) = slot {
            if on_path.contains(node.id.as_str()) {
                visual.highlighted = true;
            } else {
                visual.opacity = overlay.path_dim_opacity;
            }
        }
    }

    for (edge, slot) in graph.edges().iter().zip(composition.edges.iter_mut()) {
        *slot = Some(if path.contains_edge(edge) {
            EdgeVisual {
                opacity: 1.0,
                highlighted: true,
            }
        } else {
            EdgeVisual {
                opacity: overlay.path_dim_opacity,
                highlighted: false,
            }
        });
    }
    composition
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;
    use crate::graph::GraphPayload;
    use crate::traversal::shortest_path;

    /// A–B–C–D chain plus an isolated E.
    pub(crate) fn chain_graph() -> Graph {
        let nodes = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|id| json!({ "id": id, "type": "user", "label": id }))
            .collect::<Vec<_>>();
        let payload: GraphPayload = serde_json::from_value(json!({
            "nodes": nodes,
            "edges": [
                { "source": "A", "target": "B", "type": "CONNECTED_TO" },
                { "source": "B", "target": "C", "type": "CONNECTED_TO" },
                { "source": "C", "target": "D", "type": "CONNECTED_TO" }
            ]
        }))
        .unwrap();
        Graph::from_payload(payload)
    }

    fn opacity(composition: &Composition, graph: &Graph, id: &str) -> Option<f32> {
        composition
            .node(graph.index_of(id).unwrap())
            .map(|visual| visual.opacity)
    }

    #[test]
    fn full_mode_is_plain() {
        let graph = chain_graph();
        let composition = compose(&graph, &ViewState::Full, None, &OverlayConfig::default());
        assert_eq!(composition.rendered_node_count(), 5);
        assert!(composition.nodes.iter().flatten().all(|visual| visual.opacity == 1.0));
        assert!(composition.edges.iter().flatten().all(|visual| !visual.highlighted));
    }

    #[test]
    fn local_without_fade_excludes_non_members() {
        let graph = chain_graph();
        let view = ViewState::Local {
            focus: "B".to_owned(),
            depth: 1,
            fade: false,
        };
        let composition = compose(&graph, &view, None, &OverlayConfig::default());

        assert_eq!(composition.rendered_node_count(), 3);
        assert_eq!(opacity(&composition, &graph, "D"), None);
        assert!(composition.node(graph.index_of("B").unwrap()).unwrap().is_focus);
        // A–B and B–C survive, C–D does not.
        assert_eq!(composition.rendered_edge_count(), 2);
        assert!(composition.edge(2).is_none());
    }

    #[test]
    fn local_fade_is_monotone_and_floored() {
        let graph = chain_graph();
        let view = ViewState::Local {
            focus: "A".to_owned(),
            depth: 2,
            fade: true,
        };
        let composition = compose(&graph, &view, None, &OverlayConfig::default());

        let values = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|id| opacity(&composition, &graph, id).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 1.0 - 0.25 * 0.5);
        assert_eq!(values[3], 0.15);
        assert_eq!(values[4], 0.15);
        assert!(values.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(composition.rendered_node_count(), 5);
    }

    #[test]
    fn fade_opacity_never_increases_with_distance() {
        for depth in 0..6 {
            let mut previous = local_fade_opacity(Some(0), depth, 0.15);
            assert_eq!(previous, 1.0);
            for distance in 1..10 {
                let next = local_fade_opacity(Some(distance), depth, 0.15);
                assert!(next <= previous);
                previous = next;
            }
            assert!(local_fade_opacity(None, depth, 0.15) <= previous);
        }
    }

    #[test]
    fn path_mode_dims_everything_off_path() {
        let graph = chain_graph();
        let path = shortest_path("A", "C", graph.edges());
        let view = ViewState::Path {
            source: "A".to_owned(),
            target: "C".to_owned(),
            highlight: true,
        };
        let composition = compose(&graph, &view, Some(&path), &OverlayConfig::default());

        let a = composition.node(0).unwrap();
        assert!(a.highlighted && a.is_focus && a.opacity == 1.0);
        assert_eq!(opacity(&composition, &graph, "D"), Some(0.3));
        assert!(composition.edge(0).unwrap().highlighted);
        assert!(composition.edge(1).unwrap().highlighted);
        assert_eq!(composition.edge(2).unwrap().opacity, 0.3);
    }

    #[test]
    fn path_mode_without_highlight_keeps_full_opacity() {
        let graph = chain_graph();
        let path = shortest_path("A", "C", graph.edges());
        let view = ViewState::Path {
            source: "A".to_owned(),
            target: "C".to_owned(),
            highlight: false,
        };
        let composition = compose(&graph, &view, Some(&path), &OverlayConfig::default());
        assert!(composition.nodes.iter().flatten().all(|visual| visual.opacity == 1.0));
    }

    #[test]
    fn cluster_mode_leaves_opacity_alone() {
        let graph = chain_graph();
        let view = ViewState::Cluster {
            algorithm: ClusterAlgorithm::SkillBased,
            min_size: 3,
            show_hulls: true,
        };
        assert_eq!(
            compose(&graph, &view, None, &OverlayConfig::default()),
            Composition::full(&graph)
        );
        assert_eq!(view.hull_min_size(), Some(3));
        assert_eq!(ViewState::Full.hull_min_size(), None);
    }
}
