use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use kg_canvas::interaction::QueryToken;
use kg_canvas::{ClusterAlgorithm, EngineConfig, GraphEngine, GraphPayload, PathResult};
use tracing::{info, warn};

mod graph;
mod render_utils;
mod ui;

const SAMPLE_GRAPH: &str = include_str!("../../demos/sample_graph.json");

pub struct KgCanvasApp {
    graph_path: Option<PathBuf>,
    config: EngineConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

type LoadResult = Result<GraphPayload, String>;

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Which view the controls panel is editing. The engine only learns about it on apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewKind {
    Full,
    Local,
    Path,
    Cluster,
    Search,
}

struct ViewModel {
    engine: GraphEngine,
    pan: Vec2,
    zoom: f32,
    live_layout: bool,
    show_labels: bool,
    show_minimap: bool,
    view_kind: ViewKind,
    focus: String,
    local_depth: usize,
    local_fade: bool,
    path_source: String,
    path_target: String,
    path_highlight: bool,
    cluster_algorithm: ClusterAlgorithm,
    cluster_min_size: usize,
    show_hulls: bool,
    hulls_over_any_view: bool,
    search: String,
    path_rx: Option<Receiver<(QueryToken, PathResult)>>,
    hover_label: Rc<RefCell<Option<String>>>,
    last_clicked: Rc<RefCell<Option<String>>>,
    view_error: Option<String>,
}

impl KgCanvasApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        graph_path: Option<PathBuf>,
        config: EngineConfig,
    ) -> Self {
        let state = Self::start_load(graph_path.clone());
        Self {
            graph_path,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(graph_path: Option<PathBuf>) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // The receiver is gone when the app closed mid-load.
            let _ = tx.send(read_payload(graph_path.as_deref()));
        });
        rx
    }

    fn start_load(graph_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(graph_path),
        }
    }

    fn ready(&self, payload: GraphPayload) -> AppState {
        let mut engine = GraphEngine::new(self.config.clone());
        engine.load(payload);
        AppState::Ready(Box::new(ViewModel::new(engine)))
    }
}

fn read_payload(path: Option<&Path>) -> LoadResult {
    let Some(path) = path else {
        return GraphPayload::from_json_str(SAMPLE_GRAPH).map_err(|error| error.to_string());
    };
    let raw =
        std::fs::read_to_string(path).map_err(|error| format!("{}: {error}", path.display()))?;
    GraphPayload::from_json_str(&raw).map_err(|error| format!("{}: {error}", path.display()))
}

/// `None` while the worker is still busy.
fn poll_load(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            Some(Err("graph loader stopped without a result".to_owned()))
        }
    }
}

impl eframe::App for KgCanvasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                transition = poll_load(rx);

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.graph_path.clone()));
                }

                transition = self.reload_rx.as_ref().and_then(poll_load);
            }
        }

        if retry {
            self.state = Self::start_load(self.graph_path.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(payload) => {
                    info!(source = ?self.graph_path, "graph payload ready");
                    self.ready(payload)
                }
                Err(error) => {
                    warn!(%error, "graph load failed");
                    AppState::Error(error)
                }
            };
        }
    }
}
