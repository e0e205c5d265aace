use eframe::egui::{self, Color32, Painter, Rect, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::super::render_utils::{pan_for_center, rgb, with_opacity};

const MINIMAP_MARGIN: f32 = 12.0;

impl ViewModel {
    pub(in crate::app) fn minimap_rect(&self, canvas: Rect) -> Rect {
        let size = self.engine.minimap().minimap_size();
        Rect::from_min_size(
            canvas.right_bottom() - size - vec2(MINIMAP_MARGIN, MINIMAP_MARGIN),
            size,
        )
    }

    /// Draws the overview and feeds drags and clicks on it back into the camera.
    pub(in crate::app) fn draw_minimap(&mut self, ui: &mut Ui, painter: &Painter, rect: Rect) {
        let response = ui.interact(rect, ui.id().with("minimap"), Sense::click_and_drag());

        self.paint_minimap(painter, rect);

        let moved = if response.dragged_by(egui::PointerButton::Primary) {
            Some(self.engine.drag_minimap_viewport(response.drag_delta()))
        } else if response.clicked() {
            response
                .interact_pointer_pos()
                .map(|pointer| self.engine.click_minimap((pointer - rect.min).to_pos2()))
        } else {
            None
        };

        if let Some(viewport) = moved {
            self.pan = pan_for_center(viewport.center(), self.zoom);
            ui.ctx().request_repaint();
        }
    }

    fn paint_minimap(&self, painter: &Painter, rect: Rect) {
        let minimap = self.engine.minimap();
        painter.rect_filled(rect, 4.0, Color32::from_rgba_unmultiplied(255, 255, 255, 230));
        painter.rect_stroke(
            rect,
            4.0,
            Stroke::new(1.0, Color32::from_gray(200)),
            egui::StrokeKind::Inside,
        );

        let positions = self.engine.simulation().positions();
        let composition = self.engine.base_composition();
        for (index, node) in self.engine.graph().nodes().iter().enumerate() {
            let (Some(visual), Some(position)) = (composition.node(index), positions.get(index))
            else {
                continue;
            };
            let point = rect.min + minimap.to_minimap(position.to_pos2()).to_vec2();
            let color = with_opacity(rgb(node.display_color()), visual.opacity);
            painter.circle_filled(point, 1.8, color);
        }

        let viewport = minimap.viewport_on_minimap().translate(rect.min.to_vec2());
        painter.rect_stroke(
            viewport.intersect(rect),
            0.0,
            Stroke::new(1.5, Color32::from_rgb(9, 105, 218)),
            egui::StrokeKind::Outside,
        );
    }
}
