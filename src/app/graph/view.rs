use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, vec2};
use kg_canvas::{Frame, ViewState};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, draw_background, rgb, segment_maybe_visible,
    visible_world_rect, with_opacity, world_to_screen,
};

const EDGE_COLOR: Color32 = Color32::from_rgb(140, 149, 159);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(9, 105, 218);
const SELECTED_COLOR: Color32 = Color32::from_rgb(191, 135, 0);

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let minimap_rect = self.minimap_rect(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_camera(ui, rect, &response);
        self.handle_graph_pointer(ui, rect, &response, minimap_rect);

        let moving = self.live_layout && self.engine.tick();
        if moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.engine
            .set_camera_viewport(visible_world_rect(rect, self.pan, self.zoom));

        let hovered = {
            let frame = self.engine.frame();
            self.draw_frame(&painter, rect, &frame);
            frame.hovered
        };

        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }
        if let Some(label) = self.hover_label.borrow().as_deref() {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                label,
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }

        if self.show_minimap {
            self.draw_minimap(ui, &painter, minimap_rect);
        }
    }

    fn draw_frame(&self, painter: &egui::Painter, rect: egui::Rect, frame: &Frame<'_>) {
        if frame.graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes to show.",
                FontId::proportional(15.0),
                Color32::from_gray(90),
            );
        } else {
            let screen = frame
                .positions
                .iter()
                .map(|position| world_to_screen(rect, self.pan, self.zoom, *position))
                .collect::<Vec<_>>();

            self.draw_hulls(painter, rect, frame);
            self.draw_edges(painter, rect, frame, &screen);
            self.draw_nodes(painter, rect, frame, &screen);
        }
    }

    fn draw_hulls(&self, painter: &egui::Painter, rect: egui::Rect, frame: &Frame<'_>) {
        for hull in &frame.hulls {
            let color = rgb(frame.graph.cluster_color(hull.cluster));
            let points = hull
                .polygon
                .iter()
                .map(|point| world_to_screen(rect, self.pan, self.zoom, *point))
                .collect::<Vec<_>>();
            painter.add(Shape::convex_polygon(
                points,
                with_opacity(color, 0.12),
                Stroke::new(1.5, with_opacity(color, 0.6)),
            ));

            let label = frame
                .graph
                .cluster_info(hull.cluster)
                .map_or_else(|| format!("cluster {}", hull.cluster), |info| info.label.clone());
            painter.text(
                world_to_screen(rect, self.pan, self.zoom, hull.centroid),
                Align2::CENTER_CENTER,
                label,
                FontId::proportional(12.0),
                with_opacity(color, 0.9),
            );
        }
    }

    fn draw_edges(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        frame: &Frame<'_>,
        screen: &[Pos2],
    ) {
        let zoom_sqrt = self.zoom.sqrt();
        for (index, &(source, target)) in frame.graph.endpoints().iter().enumerate() {
            let Some(visual) = frame.composition.edge(index) else {
                continue;
            };

            let start = screen[source];
            let end = screen[target];
            if !segment_maybe_visible(rect, start, end) {
                continue;
            }

            let (width, color) = if visual.highlighted {
                ((2.4 * zoom_sqrt).clamp(1.2, 4.5), HIGHLIGHT_COLOR)
            } else {
                ((1.1 * zoom_sqrt).clamp(0.5, 3.0), EDGE_COLOR)
            };
            painter.line_segment(
                [start, end],
                Stroke::new(width, with_opacity(color, visual.opacity)),
            );
        }
    }

    fn draw_nodes(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        frame: &Frame<'_>,
        screen: &[Pos2],
    ) {
        let color_by_cluster = matches!(frame.view, ViewState::Cluster { .. });

        for (index, node) in frame.graph.nodes().iter().enumerate() {
            let Some(visual) = frame.composition.node(index) else {
                continue;
            };

            let position = screen[index];
            let radius = (frame.radii[index] * self.zoom).max(2.0);
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let base_color = match node.cluster {
                Some(cluster) if color_by_cluster => rgb(frame.graph.cluster_color(cluster)),
                _ => rgb(node.display_color()),
            };
            let is_selected = frame.selected == Some(index);
            let color = if is_selected {
                blend_color(base_color, SELECTED_COLOR, 0.55)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, with_opacity(color, visual.opacity));

            let stroke = if visual.is_focus {
                Stroke::new(2.5, with_opacity(SELECTED_COLOR, visual.opacity))
            } else if visual.highlighted {
                Stroke::new(2.0, with_opacity(HIGHLIGHT_COLOR, visual.opacity))
            } else {
                Stroke::new(1.0, with_opacity(Color32::WHITE, visual.opacity))
            };
            painter.circle_stroke(position, radius, stroke);
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.5, with_opacity(SELECTED_COLOR, 0.8)),
                );
            }

            // The hovered neighborhood is labelled even with labels switched off.
            let in_hover = frame.hover.is_some_and(|hover| hover.contains(index));
            let should_draw_label = in_hover
                || (self.show_labels
                    && (visual.highlighted || is_selected || radius > 14.0 || self.zoom > 1.3));
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    FontId::proportional(12.0),
                    with_opacity(Color32::from_gray(36), visual.opacity.max(0.4)),
                );
            }
        }
    }
}
