//! The engine ties the graph snapshot, layout, view composition, pointer handling and
//! minimap together behind one facade. A host calls [`GraphEngine::tick`] and
//! [`GraphEngine::frame`] once per rendered frame and forwards pointer input in simulation
//! coordinates; everything else is derived here.

use eframe::egui::{Pos2, Rect, Vec2};
use tracing::{debug, info};

use crate::cluster::{ClusterHull, compute_hulls};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::graph::search::query_graph;
use crate::graph::{Graph, GraphPayload, Node};
use crate::interaction::{Interaction, PathQueries, PointerEvent, QueryToken};
use crate::minimap::MinimapSync;
use crate::physics::Simulation;
use crate::traversal::{PathResult, shortest_path};
use crate::view::{Composition, HoverOverlay, ViewState, compose};

/// Upper bound on matches kept when searching the loaded graph locally.
pub const LOCAL_SEARCH_LIMIT: usize = 100;

pub type NodeCallback = Box<dyn FnMut(Option<&Node>)>;

/// Read-only snapshot of everything needed to draw one frame.
pub struct Frame<'a> {
    pub graph: &'a Graph,
    pub view: &'a ViewState,
    pub positions: &'a [Vec2],
    pub radii: &'a [f32],
    /// Base visuals with the hover overlay applied.
    pub composition: Composition,
    pub hulls: Vec<ClusterHull>,
    pub viewport: Rect,
    pub path: Option<&'a PathResult>,
    pub hover: Option<&'a HoverOverlay>,
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

pub struct GraphEngine {
    config: EngineConfig,
    graph: Graph,
    search_results: Option<Graph>,
    simulation: Simulation,
    view: ViewState,
    path: Option<PathResult>,
    path_queries: PathQueries,
    base: Composition,
    hover: Option<HoverOverlay>,
    cluster_overlay: Option<usize>,
    interaction: Interaction,
    minimap: MinimapSync,
    on_click: Option<NodeCallback>,
    on_hover: Option<NodeCallback>,
}

impl GraphEngine {
    pub fn new(config: EngineConfig) -> Self {
        let graph = Graph::default();
        let simulation = Simulation::new(&graph, config.layout.clone());
        let minimap = MinimapSync::new(config.minimap.clone());
        Self {
            base: Composition::full(&graph),
            graph,
            search_results: None,
            simulation,
            view: ViewState::Full,
            path: None,
            path_queries: PathQueries::default(),
            hover: None,
            cluster_overlay: None,
            interaction: Interaction::default(),
            minimap,
            on_click: None,
            on_hover: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replaces the whole graph. View, path, hover, drag and selection all start over.
    pub fn load(&mut self, payload: GraphPayload) {
        self.graph = Graph::from_payload(payload);
        self.search_results = None;
        self.view = ViewState::Full;
        self.path = None;
        self.path_queries.cancel_all();
        self.restart_layout();

        info!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "loaded graph"
        );
    }

    pub fn load_json(&mut self, raw: &str) -> Result<()> {
        self.load(GraphPayload::from_json_str(raw)?);
        Ok(())
    }

    /// Shows a search result graph in place of the loaded one until another view is chosen.
    pub fn load_search_results(&mut self, query: &str, payload: GraphPayload) {
        self.enter_search(query, Graph::from_payload(payload));
    }

    /// Fuzzy-searches the loaded graph and shows the matches.
    pub fn search(&mut self, query: &str) {
        let results = query_graph(&self.graph, query, LOCAL_SEARCH_LIMIT);
        self.enter_search(query, results);
    }

    fn enter_search(&mut self, query: &str, results: Graph) {
        info!(
            query,
            matches = results.node_count(),
            "showing search results"
        );
        self.search_results = Some(results);
        self.view = ViewState::Search {
            query: query.to_owned(),
        };
        self.path = None;
        self.path_queries.cancel_all();
        self.restart_layout();
    }

    fn restart_layout(&mut self) {
        let graph = self.search_results.as_ref().unwrap_or(&self.graph);
        self.simulation.reset(graph);
        self.base = compose(graph, &self.view, self.path.as_ref(), &self.config.overlay);
        self.hover = None;
        self.interaction.reset();
        self.minimap.update_bounds(self.simulation.bounds());
    }

    /// The graph currently being laid out and rendered.
    pub fn graph(&self) -> &Graph {
        self.search_results.as_ref().unwrap_or(&self.graph)
    }

    /// The graph from the last [`GraphEngine::load`], regardless of search mode.
    pub fn primary_graph(&self) -> &Graph {
        &self.graph
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn path(&self) -> Option<&PathResult> {
        self.path.as_ref()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn minimap(&self) -> &MinimapSync {
        &self.minimap
    }

    pub fn hovered(&self) -> Option<&Node> {
        self.interaction
            .hovered()
            .and_then(|index| self.graph().nodes().get(index))
    }

    pub fn selected(&self) -> Option<&Node> {
        self.interaction
            .selected()
            .and_then(|index| self.graph().nodes().get(index))
    }

    pub fn on_click(&mut self, callback: impl FnMut(Option<&Node>) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn on_hover(&mut self, callback: impl FnMut(Option<&Node>) + 'static) {
        self.on_hover = Some(Box::new(callback));
    }

    /// Advances the layout one step. Returns `false` once it has settled.
    pub fn tick(&mut self) -> bool {
        let moving = self.simulation.tick();
        self.minimap.update_bounds(self.simulation.bounds());
        moving
    }

    /// Switches view mode. Node ids named by the view must exist in the loaded graph.
    ///
    /// Choosing `Search` here searches the loaded graph locally; any other mode leaves
    /// search results behind and restores the loaded graph.
    pub fn set_view(&mut self, view: ViewState) -> Result<()> {
        // A path view still waiting on `complete_path_query` is resolved here instead.
        let awaiting_path = matches!(view, ViewState::Path { .. }) && self.path.is_none();
        if view == self.view && !awaiting_path {
            return Ok(());
        }

        match &view {
            ViewState::Local { focus, .. } => self.require_node(focus)?,
            ViewState::Path { source, target, .. } => {
                self.require_node(source)?;
                self.require_node(target)?;
            }
            ViewState::Search { query } => {
                let query = query.clone();
                self.search(&query);
                return Ok(());
            }
            ViewState::Full | ViewState::Cluster { .. } => {}
        }

        debug!(from = self.view.label(), to = view.label(), "switching view");
        self.path_queries.cancel_all();
        self.path = match &view {
            ViewState::Path { source, target, .. } => {
                let path = shortest_path(source, target, self.graph.edges());
                if !path.found {
                    info!(%source, %target, "no path between nodes");
                }
                Some(path)
            }
            _ => None,
        };
        self.view = view;

        if self.search_results.take().is_some() {
            self.restart_layout();
        } else {
            self.recompose();
        }
        Ok(())
    }

    /// Draws cluster hulls of at least `min_size` members over whichever view is active.
    /// `None` leaves hulls to a `Cluster` view with `show_hulls` set.
    pub fn set_cluster_overlay(&mut self, min_size: Option<usize>) {
        self.cluster_overlay = min_size;
    }

    /// Enters path mode and waits for the path to be supplied through
    /// [`GraphEngine::complete_path_query`]. Any earlier outstanding query is superseded.
    pub fn begin_path_query(&mut self, source: &str, target: &str) -> Result<QueryToken> {
        self.require_node(source)?;
        self.require_node(target)?;

        let token = self.path_queries.begin();
        self.view = ViewState::Path {
            source: source.to_owned(),
            target: target.to_owned(),
            highlight: true,
        };
        self.path = None;
        if self.search_results.take().is_some() {
            self.restart_layout();
        } else {
            self.recompose();
        }
        Ok(token)
    }

    /// Applies a path result. Returns `false` and discards it when a newer query or view
    /// change has superseded `token`.
    pub fn complete_path_query(&mut self, token: QueryToken, path: PathResult) -> bool {
        if !self.path_queries.is_current(token) {
            debug!(?token, "discarding stale path result");
            return false;
        }

        self.path = Some(path);
        self.recompose();
        true
    }

    fn require_node(&self, id: &str) -> Result<()> {
        match self.graph.index_of(id) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownNode(id.to_owned())),
        }
    }

    fn recompose(&mut self) {
        let graph = self.search_results.as_ref().unwrap_or(&self.graph);
        self.base = compose(graph, &self.view, self.path.as_ref(), &self.config.overlay);
    }

    /// The cached base composition, without hover.
    pub fn base_composition(&self) -> &Composition {
        &self.base
    }

    pub fn frame(&self) -> Frame<'_> {
        let graph = self.graph();
        let composition = match &self.hover {
            Some(hover) => hover.apply(&self.base, graph, &self.config.overlay),
            None => self.base.clone(),
        };
        let hulls = self
            .view
            .hull_min_size()
            .or(self.cluster_overlay)
            .map(|min_size| {
                compute_hulls(
                    graph,
                    self.simulation.positions(),
                    &self.config.cluster,
                    min_size,
                )
            })
            .unwrap_or_default();

        Frame {
            graph,
            view: &self.view,
            positions: self.simulation.positions(),
            radii: self.simulation.radii(),
            composition,
            hulls,
            viewport: self.minimap.viewport(),
            path: self.path.as_ref(),
            hover: self.hover.as_ref(),
            hovered: self.hover.as_ref().map(HoverOverlay::node),
            selected: self.interaction.selected(),
        }
    }

    /// Rendered node under `at`; nodes excluded by the view cannot be hit.
    pub fn node_at(&self, at: Pos2) -> Option<usize> {
        self.simulation
            .node_at(at)
            .filter(|&index| self.base.node(index).is_some())
    }

    pub fn pointer_moved(&mut self, at: Pos2) {
        let hit = self.node_at(at);
        let Some(PointerEvent::HoverChanged(hit)) = self.interaction.pointer_moved(hit) else {
            return;
        };

        let graph = self.search_results.as_ref().unwrap_or(&self.graph);
        self.hover = hit.and_then(|index| HoverOverlay::new(graph, index));
        let node = hit.and_then(|index| graph.nodes().get(index));
        if let Some(callback) = self.on_hover.as_mut() {
            callback(node);
        }
    }

    pub fn pointer_pressed(&mut self, at: Pos2) {
        let hit = self.node_at(at);
        self.interaction.pointer_pressed(at, hit);
    }

    pub fn pointer_dragged(&mut self, at: Pos2) {
        match self.interaction.pointer_dragged(at) {
            Some(PointerEvent::DragStarted { node, at }) => {
                debug!(node, "drag started");
                self.simulation.begin_drag(node, at.to_vec2());
            }
            Some(PointerEvent::DragMoved { at, .. }) => self.simulation.drag_to(at.to_vec2()),
            _ => {}
        }
    }

    pub fn pointer_released(&mut self) {
        match self.interaction.pointer_released() {
            Some(PointerEvent::DragEnded { node }) => {
                debug!(node, "drag ended");
                self.simulation.end_drag();
            }
            Some(PointerEvent::Clicked(hit)) => {
                let graph = self.search_results.as_ref().unwrap_or(&self.graph);
                let node = hit.and_then(|index| graph.nodes().get(index));
                if let Some(callback) = self.on_click.as_mut() {
                    callback(node);
                }
            }
            _ => {}
        }
    }

    pub fn viewport(&self) -> Rect {
        self.minimap.viewport()
    }

    /// Adopts the main camera's visible rectangle. Returns it after clamping into bounds.
    pub fn set_camera_viewport(&mut self, viewport: Rect) -> Rect {
        self.minimap.set_viewport(viewport)
    }

    pub fn drag_minimap_viewport(&mut self, minimap_delta: Vec2) -> Rect {
        self.minimap.drag_viewport(minimap_delta)
    }

    pub fn click_minimap(&mut self, minimap_point: Pos2) -> Rect {
        self.minimap.center_on(minimap_point)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    fn payload() -> GraphPayload {
        serde_json::from_value(json!({
            "nodes": [
                { "id": "A", "type": "user", "label": "Ada" },
                { "id": "B", "type": "skill", "label": "Rust" },
                { "id": "C", "type": "user", "label": "Grace" },
                { "id": "D", "type": "community", "label": "Systems" }
            ],
            "edges": [
                { "source": "A", "target": "B", "type": "HAS_SKILL" },
                { "source": "B", "target": "C", "type": "HAS_SKILL" },
                { "source": "C", "target": "D", "type": "MEMBER_OF" },
                { "source": "D", "target": "Z", "type": "MEMBER_OF" }
            ]
        }))
        .unwrap()
    }

    fn engine() -> GraphEngine {
        let mut config = EngineConfig::default();
        config.layout.seed = Some(7);
        let mut engine = GraphEngine::new(config);
        engine.load(payload());
        engine
    }

    #[test]
    fn load_drops_dangling_edges_and_resets_view() {
        let mut engine = engine();
        assert_eq!(engine.graph().edge_count(), 3);

        engine
            .set_view(ViewState::Local {
                focus: "A".to_owned(),
                depth: 1,
                fade: false,
            })
            .unwrap();
        engine.load(payload());
        assert_eq!(engine.view(), &ViewState::Full);
        assert_eq!(engine.frame().composition.rendered_node_count(), 4);
    }

    #[test]
    fn unknown_focus_is_rejected() {
        let mut engine = engine();
        let err = engine
            .set_view(ViewState::Local {
                focus: "nope".to_owned(),
                depth: 1,
                fade: false,
            })
            .unwrap_err();
        assert!(matches!(err, Error::UnknownNode(id) if id == "nope"));
        assert_eq!(engine.view(), &ViewState::Full);
    }

    #[test]
    fn path_view_computes_shortest_path() {
        let mut engine = engine();
        engine
            .set_view(ViewState::Path {
                source: "A".to_owned(),
                target: "D".to_owned(),
                highlight: true,
            })
            .unwrap();

        let path = engine.path().unwrap();
        assert!(path.found);
        assert_eq!(path.nodes, ["A", "B", "C", "D"]);
        assert!(
            engine
                .frame()
                .composition
                .edges
                .iter()
                .flatten()
                .all(|visual| visual.highlighted)
        );
    }

    #[test]
    fn stale_path_results_are_discarded() {
        let mut engine = engine();
        let first = engine.begin_path_query("A", "C").unwrap();
        let second = engine.begin_path_query("A", "D").unwrap();

        assert!(!engine.complete_path_query(first, PathResult::not_found()));
        assert!(engine.path().is_none());

        let edges = engine.graph().edges().to_vec();
        assert!(engine.complete_path_query(second, shortest_path("A", "D", &edges)));
        assert_eq!(engine.path().unwrap().len(), 4);

        let third = engine.begin_path_query("B", "D").unwrap();
        engine.set_view(ViewState::Full).unwrap();
        assert!(!engine.complete_path_query(third, PathResult::not_found()));
    }

    #[test]
    fn pending_path_is_resolved_by_setting_the_same_view() {
        let mut engine = engine();
        let pending = engine.begin_path_query("A", "C").unwrap();
        assert!(engine.path().is_none());

        engine
            .set_view(ViewState::Path {
                source: "A".to_owned(),
                target: "C".to_owned(),
                highlight: true,
            })
            .unwrap();
        let path = engine.path().unwrap();
        assert!(path.found);
        assert_eq!(path.nodes, ["A", "B", "C"]);

        assert!(!engine.complete_path_query(pending, PathResult::not_found()));
        assert!(engine.path().unwrap().found);
    }

    #[test]
    fn search_swaps_graph_until_another_view() {
        let mut engine = engine();
        engine.search("ada");
        assert_eq!(engine.view().label(), "search");
        assert_eq!(engine.graph().node_count(), 1);
        assert_eq!(engine.simulation().node_count(), 1);

        engine.set_view(ViewState::Full).unwrap();
        assert_eq!(engine.graph().node_count(), 4);
        assert_eq!(engine.simulation().node_count(), 4);
    }

    #[test]
    fn external_search_results_replace_rendered_graph() {
        let mut engine = engine();
        let results = serde_json::from_value(json!({
            "nodes": [{ "id": "q", "type": "search", "label": "query hit" }],
            "edges": []
        }))
        .unwrap();
        engine.load_search_results("hit", results);

        assert_eq!(
            engine.view(),
            &ViewState::Search {
                query: "hit".to_owned()
            }
        );
        assert!(engine.graph().node("q").is_some());
        assert!(engine.primary_graph().node("q").is_none());

        engine
            .set_view(ViewState::Local {
                focus: "A".to_owned(),
                depth: 1,
                fade: false,
            })
            .unwrap();
        assert_eq!(engine.graph().node_count(), 4);
        assert_eq!(engine.frame().composition.rendered_node_count(), 2);
    }

    #[test]
    fn pointer_click_and_hover_reach_callbacks() {
        let mut engine = engine();
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let hovered = Rc::new(RefCell::new(Vec::new()));
        {
            let clicked = Rc::clone(&clicked);
            engine.on_click(move |node| clicked.borrow_mut().push(node.map(|n| n.id.clone())));
            let hovered = Rc::clone(&hovered);
            engine.on_hover(move |node| hovered.borrow_mut().push(node.map(|n| n.id.clone())));
        }

        let b = engine.graph().index_of("B").unwrap();
        let at = engine.simulation().positions()[b].to_pos2();
        engine.pointer_moved(at);
        assert_eq!(engine.hovered().map(|node| node.id.as_str()), Some("B"));
        let frame = engine.frame();
        assert!(frame.composition.node(b).unwrap().highlighted);
        let hover = frame.hover.unwrap();
        assert_eq!(hover.node(), b);
        assert!(hover.contains(engine.graph().index_of("A").unwrap()));
        assert!(!hover.contains(engine.graph().index_of("D").unwrap()));
        drop(frame);

        engine.pointer_pressed(at);
        engine.pointer_released();
        assert_eq!(engine.selected().map(|node| node.id.as_str()), Some("B"));

        assert_eq!(*clicked.borrow(), [Some("B".to_owned())]);

        engine.pointer_moved(Pos2::new(1.0e5, 1.0e5));
        let frame = engine.frame();
        assert!(frame.hover.is_none());
        assert_eq!(&frame.composition, engine.base_composition());
        drop(frame);
        assert_eq!(*hovered.borrow(), [Some("B".to_owned()), None]);
    }

    #[test]
    fn dragging_pins_node_to_pointer() {
        let mut engine = engine();
        let a = engine.graph().index_of("A").unwrap();
        let start = engine.simulation().positions()[a].to_pos2();
        let target = start + Vec2::new(80.0, -40.0);

        engine.pointer_pressed(start);
        engine.pointer_dragged(target);
        for _ in 0..5 {
            engine.tick();
        }
        assert_eq!(engine.simulation().positions()[a], target.to_vec2());
        assert!(engine.simulation().is_pinned(a));

        engine.pointer_released();
        assert!(!engine.simulation().is_pinned(a));
        assert!(engine.selected().is_none());
    }

    #[test]
    fn cluster_view_with_hulls_reports_them() {
        let mut config = EngineConfig::default();
        config.layout.seed = Some(3);
        let mut engine = GraphEngine::new(config);
        engine.load(
            serde_json::from_value(json!({
                "nodes": [
                    { "id": "a", "type": "user", "label": "a", "cluster": 1 },
                    { "id": "b", "type": "user", "label": "b", "cluster": 1 },
                    { "id": "c", "type": "user", "label": "c", "cluster": 1 },
                    { "id": "d", "type": "user", "label": "d", "cluster": 2 }
                ],
                "edges": []
            }))
            .unwrap(),
        );
        for _ in 0..20 {
            engine.tick();
        }

        assert!(engine.frame().hulls.is_empty());
        engine
            .set_view(ViewState::Cluster {
                algorithm: Default::default(),
                min_size: 3,
                show_hulls: true,
            })
            .unwrap();
        let hulls = engine.frame().hulls;
        assert_eq!(hulls.len(), 1);
        assert_eq!(hulls[0].cluster, 1);
    }

    #[test]
    fn cluster_overlay_draws_hulls_over_other_views() {
        let mut config = EngineConfig::default();
        config.layout.seed = Some(4);
        let mut engine = GraphEngine::new(config);
        engine.load(
            serde_json::from_value(json!({
                "nodes": [
                    { "id": "a", "type": "user", "label": "a", "cluster": 1 },
                    { "id": "b", "type": "user", "label": "b", "cluster": 1 },
                    { "id": "c", "type": "user", "label": "c", "cluster": 1 }
                ],
                "edges": []
            }))
            .unwrap(),
        );
        for _ in 0..20 {
            engine.tick();
        }

        engine.set_cluster_overlay(Some(3));
        engine
            .set_view(ViewState::Local {
                focus: "a".to_owned(),
                depth: 1,
                fade: true,
            })
            .unwrap();
        let frame = engine.frame();
        assert_eq!(frame.hulls.len(), 1);
        assert!(frame.composition.nodes.iter().flatten().any(|visual| visual.opacity < 1.0));
        drop(frame);

        engine.set_cluster_overlay(None);
        assert!(engine.frame().hulls.is_empty());
    }
}
