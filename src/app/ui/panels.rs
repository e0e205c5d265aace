use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::TryRecvError;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use kg_canvas::{ClusterAlgorithm, GraphEngine};
use tracing::debug;

use super::super::{ViewKind, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(mut engine: GraphEngine) -> Self {
        let hover_label = Rc::new(RefCell::new(None));
        let last_clicked = Rc::new(RefCell::new(None));

        let hovered = Rc::clone(&hover_label);
        engine.on_hover(move |node| {
            *hovered.borrow_mut() =
                node.map(|node| format!("{} ({})", node.label, node.kind.as_str()));
        });
        let clicked = Rc::clone(&last_clicked);
        engine.on_click(move |node| {
            debug!(node = node.map(|node| node.id.as_str()), "node clicked");
            *clicked.borrow_mut() = node.map(|node| node.id.clone());
        });

        let focus = engine
            .graph()
            .metadata()
            .center_node
            .clone()
            .or_else(|| engine.graph().nodes().first().map(|node| node.id.clone()))
            .unwrap_or_default();

        Self {
            engine,
            pan: Vec2::ZERO,
            zoom: 1.0,
            live_layout: true,
            show_labels: true,
            show_minimap: true,
            view_kind: ViewKind::Full,
            path_source: focus.clone(),
            path_target: String::new(),
            focus,
            local_depth: 2,
            local_fade: true,
            path_highlight: true,
            cluster_algorithm: ClusterAlgorithm::default(),
            cluster_min_size: 3,
            show_hulls: true,
            hulls_over_any_view: false,
            search: String::new(),
            path_rx: None,
            hover_label,
            last_clicked,
            view_error: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.poll_path_query();
        self.follow_clicks();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("kg-canvas");
                    ui.separator();
                    let graph = self.engine.graph();
                    ui.label(format!("view: {}", self.engine.view().label()));
                    ui.label(format!("nodes: {}", graph.node_count()));
                    ui.label(format!("edges: {}", graph.edge_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let alpha = self.engine.simulation().alpha();
                        if self.engine.simulation().is_settled() {
                            ui.label("layout settled");
                        } else {
                            ui.label(format!("layout alpha {alpha:.3}"));
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    /// Clicking a node while editing a local view moves the focus there.
    fn follow_clicks(&mut self) {
        let Some(clicked) = self.last_clicked.borrow_mut().take() else {
            return;
        };

        match self.view_kind {
            ViewKind::Local => {
                self.focus = clicked;
                self.apply_view();
            }
            ViewKind::Path if self.path_target.is_empty() => {
                self.path_target = clicked;
            }
            _ => {}
        }
    }

    fn poll_path_query(&mut self) {
        let Some(rx) = self.path_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok((token, path)) => {
                self.engine.complete_path_query(token, path);
            }
            Err(TryRecvError::Empty) => {
                self.path_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.view_error = Some("Path worker disconnected".to_owned());
            }
        }
    }
}
