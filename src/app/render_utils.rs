use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

pub(super) fn rgb(color: [u8; 3]) -> Color32 {
    Color32::from_rgb(color[0], color[1], color[2])
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| ((a as f32 * (1.0 - amount)) + (b as f32 * amount)) as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

/// Applies a composed opacity to an opaque color.
pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(246, 248, 250));

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(208, 215, 222, 110));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

/// Cheap reject for segments whose bounding box misses the canvas.
pub(super) fn segment_maybe_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    Rect::from_two_pos(start, end).intersects(rect)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// World-space rectangle currently shown on the canvas.
pub(super) fn visible_world_rect(rect: Rect, pan: Vec2, zoom: f32) -> Rect {
    Rect::from_min_max(
        screen_to_world(rect, pan, zoom, rect.min).to_pos2(),
        screen_to_world(rect, pan, zoom, rect.max).to_pos2(),
    )
}

/// Pan that puts `world_center` in the middle of the canvas.
pub(super) fn pan_for_center(world_center: Pos2, zoom: f32) -> Vec2 {
    -(world_center.to_vec2() * zoom)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn screen_and_world_round_trip() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), vec2(800.0, 600.0));
        let pan = vec2(-40.0, 15.0);
        let world = vec2(123.0, -45.0);
        let screen = world_to_screen(rect, pan, 1.7, world);
        assert!((screen_to_world(rect, pan, 1.7, screen) - world).length() < 1e-3);
    }

    #[test]
    fn pan_for_center_centers_the_point() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0));
        let zoom = 0.5;
        let pan = pan_for_center(Pos2::new(200.0, -80.0), zoom);
        let visible = visible_world_rect(rect, pan, zoom);
        assert!((visible.center() - Pos2::new(200.0, -80.0)).length() < 1e-3);
    }
}
