use std::sync::mpsc;
use std::thread;

use eframe::egui::{self, Key, RichText, Ui};
use kg_canvas::{ClusterAlgorithm, ViewState, shortest_path};
use tracing::warn;

use super::super::{ViewKind, ViewModel};

const VIEW_KINDS: [(ViewKind, &str); 5] = [
    (ViewKind::Full, "Full graph"),
    (ViewKind::Local, "Local (ego network)"),
    (ViewKind::Path, "Shortest path"),
    (ViewKind::Cluster, "Clusters"),
    (ViewKind::Search, "Search"),
];

const CLUSTER_ALGORITHMS: [(ClusterAlgorithm, &str); 3] = [
    (ClusterAlgorithm::Louvain, "Louvain"),
    (ClusterAlgorithm::KMeans, "k-means"),
    (ClusterAlgorithm::SkillBased, "Skill based"),
];

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("View");
        ui.add_space(4.0);

        let mut kind_changed = false;
        for (kind, label) in VIEW_KINDS {
            kind_changed |= ui.radio_value(&mut self.view_kind, kind, label).changed();
        }
        ui.separator();

        let mut apply = kind_changed
            && matches!(self.view_kind, ViewKind::Full | ViewKind::Cluster);
        match self.view_kind {
            ViewKind::Full => {
                ui.label("All nodes and edges at full opacity.");
            }
            ViewKind::Local => {
                ui.label("Focus node id");
                apply |= Self::id_field(ui, &mut self.focus);
                apply |= ui
                    .add(egui::Slider::new(&mut self.local_depth, 1..=6).text("depth"))
                    .changed();
                apply |= ui
                    .checkbox(&mut self.local_fade, "Fade by distance")
                    .changed();
                ui.small("Click a node on the canvas to refocus.");
            }
            ViewKind::Path => {
                ui.label("Source node id");
                Self::id_field(ui, &mut self.path_source);
                ui.label("Target node id");
                Self::id_field(ui, &mut self.path_target);
                ui.checkbox(&mut self.path_highlight, "Highlight path");
                apply |= ui.button("Find path").clicked();
            }
            ViewKind::Cluster => {
                egui::ComboBox::from_label("Algorithm")
                    .selected_text(self.cluster_algorithm.as_str())
                    .show_ui(ui, |ui| {
                        for (algorithm, label) in CLUSTER_ALGORITHMS {
                            apply |= ui
                                .selectable_value(&mut self.cluster_algorithm, algorithm, label)
                                .changed();
                        }
                    });
                apply |= ui
                    .add(egui::Slider::new(&mut self.cluster_min_size, 3..=20).text("min size"))
                    .changed();
                apply |= ui.checkbox(&mut self.show_hulls, "Show hulls").changed();
            }
            ViewKind::Search => {
                ui.label("Query");
                let response = ui.text_edit_singleline(&mut self.search);
                let submitted =
                    response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
                apply |= submitted || ui.button("Search").clicked();
            }
        }

        if apply {
            self.apply_view();
        }

        if let Some(error) = &self.view_error {
            ui.add_space(4.0);
            ui.colored_label(egui::Color32::from_rgb(207, 34, 46), error);
        }

        ui.separator();
        ui.heading("Layout");
        ui.checkbox(&mut self.live_layout, "Live layout");
        ui.checkbox(&mut self.show_labels, "Show labels");
        ui.checkbox(&mut self.show_minimap, "Show minimap");
        ui.checkbox(&mut self.hulls_over_any_view, "Cluster hulls in every view");
        self.engine
            .set_cluster_overlay(self.hulls_over_any_view.then_some(self.cluster_min_size));
        if ui.button("Reset camera").clicked() {
            self.pan = egui::Vec2::ZERO;
            self.zoom = 1.0;
        }

        ui.separator();
        ui.label(RichText::new("Legend").strong());
        let graph = self.engine.graph();
        let mut kinds = graph
            .nodes()
            .iter()
            .map(|node| node.kind.clone())
            .collect::<Vec<_>>();
        kinds.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        kinds.dedup();
        for kind in kinds {
            let [r, g, b] = kind.color();
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(r, g, b), "●");
                ui.label(kind.as_str());
            });
        }
    }

    fn id_field(ui: &mut Ui, value: &mut String) -> bool {
        let response = ui.text_edit_singleline(value);
        response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter))
    }

    /// Pushes the edited view into the engine.
    pub(in crate::app) fn apply_view(&mut self) {
        self.view_error = None;

        let result = match self.view_kind {
            ViewKind::Full => self.engine.set_view(ViewState::Full),
            ViewKind::Local => self.engine.set_view(ViewState::Local {
                focus: self.focus.trim().to_owned(),
                depth: self.local_depth,
                fade: self.local_fade,
            }),
            ViewKind::Path if self.path_highlight => self.start_path_query(),
            ViewKind::Path => self.engine.set_view(ViewState::Path {
                source: self.path_source.trim().to_owned(),
                target: self.path_target.trim().to_owned(),
                highlight: false,
            }),
            ViewKind::Cluster => self.engine.set_view(ViewState::Cluster {
                algorithm: self.cluster_algorithm,
                min_size: self.cluster_min_size,
                show_hulls: self.show_hulls,
            }),
            ViewKind::Search => {
                let query = self.search.trim().to_owned();
                self.engine.set_view(ViewState::Search { query })
            }
        };

        if let Err(error) = result {
            warn!(%error, "view change rejected");
            self.view_error = Some(error.to_string());
        }
    }

    /// Resolves the path on a worker thread; only the newest request is applied.
    fn start_path_query(&mut self) -> kg_canvas::Result<()> {
        let source = self.path_source.trim().to_owned();
        let target = self.path_target.trim().to_owned();
        let token = self.engine.begin_path_query(&source, &target)?;
        let edges = self.engine.primary_graph().edges().to_vec();

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let path = shortest_path(&source, &target, &edges);
            let _ = tx.send((token, path));
        });
        self.path_rx = Some(rx);
        Ok(())
    }
}
