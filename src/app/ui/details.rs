use eframe::egui::{self, RichText, Ui};
use kg_canvas::ViewState;
use kg_canvas::traversal::humanize_relation;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        self.draw_path_summary(ui);

        ui.heading("Selection");
        ui.add_space(6.0);

        let Some(node) = self.engine.selected() else {
            ui.label("Click a node on the canvas to inspect it.");
            return;
        };

        ui.label(RichText::new(&node.label).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);
        ui.label(format!("Type: {}", node.kind.as_str()));
        if let Some(centrality) = node.centrality {
            ui.label(format!("Centrality: {centrality:.2}"));
        }
        if let Some(cluster) = node.cluster {
            let graph = self.engine.graph();
            match graph.cluster_info(cluster) {
                Some(info) => {
                    ui.label(format!("Cluster: {} ({})", info.label, info.id));
                    let members = match &info.dominant_type {
                        Some(kind) => format!("{} members, mostly {}", info.size, kind.as_str()),
                        None => format!("{} members", info.size),
                    };
                    ui.small(members);
                    if !info.top_skills.is_empty() {
                        ui.small(format!("Top skills: {}", info.top_skills.join(", ")));
                    }
                }
                None => {
                    ui.label(format!("Cluster: {cluster}"));
                }
            }
        }
        if let Some(url) = &node.image_url {
            ui.hyperlink_to("Image", url);
        }

        if !node.properties.is_empty() {
            ui.separator();
            ui.label(RichText::new("Properties").strong());
            egui::Grid::new("node_properties")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (key, value) in &node.properties {
                        ui.label(key);
                        match value.as_str() {
                            Some(text) => ui.label(text),
                            None => ui.label(value.to_string()),
                        };
                        ui.end_row();
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());
        let id = node.id.clone();
        let graph = self.engine.graph();
        let mut any = false;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for edge in graph.edges().iter().filter(|edge| edge.touches(&id)) {
                let Some(other) = edge.other_end(&id).and_then(|other| graph.node(other)) else {
                    continue;
                };
                any = true;
                let relation = edge
                    .label
                    .clone()
                    .unwrap_or_else(|| humanize_relation(&edge.kind));
                ui.label(format!("{relation} · {}", other.label));
            }
        });
        if !any {
            ui.label("No connections in the current graph.");
        }
    }

    fn draw_path_summary(&self, ui: &mut Ui) {
        let ViewState::Path { source, target, .. } = self.engine.view() else {
            return;
        };

        ui.heading("Path");
        match self.engine.path() {
            None => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Searching {source} → {target}..."));
                });
            }
            Some(path) if !path.found => {
                ui.label(format!("No connection between {source} and {target}."));
            }
            Some(path) => {
                ui.label(format!("{} hops", path.len().saturating_sub(1)));
                let graph = self.engine.graph();
                let names = path
                    .nodes
                    .iter()
                    .map(|id| graph.node(id).map_or(id.as_str(), |node| node.label.as_str()))
                    .collect::<Vec<_>>();
                ui.label(names.join(" → "));
                if !path.relation_types.is_empty() {
                    ui.small(path.relation_types.join(", "));
                }
            }
        }
        ui.separator();
    }
}
