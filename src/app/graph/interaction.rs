use eframe::egui::{self, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

const WHEEL_ZOOM_RATE: f32 = 0.0015;
const MIN_ZOOM: f32 = 0.05;
const MAX_ZOOM: f32 = 6.0;

impl ViewModel {
    /// Wheel and pinch zoom around the pointer, secondary or middle drag pans.
    pub(in crate::app) fn handle_camera(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
        if !response.hovered() {
            return;
        }

        let (wheel, pinch, anchor) = ui.input(|input| {
            (
                input.smooth_scroll_delta.y,
                input.zoom_delta(),
                input.pointer.hover_pos(),
            )
        });
        let factor = pinch * (wheel * WHEEL_ZOOM_RATE).exp();
        if (factor - 1.0).abs() <= f32::EPSILON {
            return;
        }

        let anchor = anchor.unwrap_or_else(|| rect.center());
        let world = screen_to_world(rect, self.pan, self.zoom, anchor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        // Keep the world point under the pointer fixed.
        self.pan = anchor - rect.center() - world * self.zoom;
    }

    /// Forwards primary-button input to the engine in simulation coordinates. Presses over
    /// the minimap belong to the minimap.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        minimap_rect: Rect,
    ) {
        let (pointer, pressed, down, released) = ui.input(|input| {
            (
                input.pointer.interact_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_down(),
                input.pointer.primary_released(),
            )
        });
        let over_minimap =
            self.show_minimap && pointer.is_some_and(|pointer| minimap_rect.contains(pointer));

        if let Some(pointer) = pointer {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer).to_pos2();
            if response.hovered() && !over_minimap {
                self.engine.pointer_moved(world);
                if pressed {
                    self.engine.pointer_pressed(world);
                }
            }
            if down {
                self.engine.pointer_dragged(world);
            }
        }

        if released {
            self.engine.pointer_released();
        }
    }
}
