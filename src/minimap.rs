//! Two-way mapping between simulation space and a fixed-size minimap.
//!
//! The synchronizer owns the viewport rectangle (in simulation coordinates) and the scale
//! math. Whatever camera renders the main canvas reads the viewport back after minimap drags
//! and clicks, and pushes its own visible rectangle in through [`MinimapSync::set_viewport`].

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::config::MinimapConfig;

#[derive(Clone, Debug)]
pub struct MinimapSync {
    config: MinimapConfig,
    bounds: Rect,
    viewport: Rect,
}

impl MinimapSync {
    pub fn new(config: MinimapConfig) -> Self {
        let bounds = Rect::from_center_size(
            Pos2::ZERO,
            vec2(config.width, config.height) + Vec2::splat(config.padding * 2.0),
        );
        Self {
            config,
            bounds,
            viewport: bounds,
        }
    }

    pub fn minimap_size(&self) -> Vec2 {
        vec2(self.config.width, self.config.height)
    }

    /// Node bounding box plus padding.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Refreshes the mapped region from the current node bounding box. `None` (no nodes)
    /// keeps the previous region.
    pub fn update_bounds(&mut self, node_bounds: Option<Rect>) {
        let Some(node_bounds) = node_bounds.filter(|rect| rect.is_finite()) else {
            return;
        };

        self.bounds = node_bounds.expand(self.config.padding);
        self.viewport = self.clamp(self.viewport);
    }

    /// Minimap units per simulation unit, per axis.
    pub fn scale(&self) -> Vec2 {
        let size = self.bounds.size().max(Vec2::splat(f32::EPSILON));
        self.minimap_size() / size
    }

    pub fn to_minimap(&self, world: Pos2) -> Pos2 {
        ((world - self.bounds.min) * self.scale()).to_pos2()
    }

    pub fn to_world(&self, minimap: Pos2) -> Pos2 {
        self.bounds.min + minimap.to_vec2() / self.scale()
    }

    pub fn viewport_on_minimap(&self) -> Rect {
        Rect::from_min_max(
            self.to_minimap(self.viewport.min),
            self.to_minimap(self.viewport.max),
        )
    }

    /// Adopts the camera's visible rectangle, clamped into bounds.
    pub fn set_viewport(&mut self, viewport: Rect) -> Rect {
        self.viewport = self.clamp(viewport);
        self.viewport
    }

    /// Moves the viewport by a pointer delta measured on the minimap.
    pub fn drag_viewport(&mut self, minimap_delta: Vec2) -> Rect {
        let world_delta = minimap_delta / self.scale();
        self.viewport = self.clamp(self.viewport.translate(world_delta));
        self.viewport
    }

    /// Recenters the viewport on a point clicked on the minimap.
    pub fn center_on(&mut self, minimap_point: Pos2) -> Rect {
        let center = self.to_world(minimap_point);
        self.viewport = self.clamp(Rect::from_center_size(center, self.viewport.size()));
        self.viewport
    }

    /// Keeps the viewport's min corner within `[bounds.min, bounds.max - size]` on each
    /// axis. When the viewport is larger than the bounds on an axis it is pinned to
    /// `bounds.min` on that axis.
    fn clamp(&self, viewport: Rect) -> Rect {
        let size = viewport.size();
        let clamp_axis = |value: f32, min: f32, max: f32| value.min(max).max(min);
        let x = clamp_axis(viewport.min.x, self.bounds.min.x, self.bounds.max.x - size.x);
        let y = clamp_axis(viewport.min.y, self.bounds.min.y, self.bounds.max.y - size.y);
        Rect::from_min_size(Pos2::new(x, y), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced() -> MinimapSync {
        let mut sync = MinimapSync::new(MinimapConfig {
            width: 200.0,
            height: 100.0,
            padding: 50.0,
        });
        // Nodes span (-150,-50)..(250,150); padded bounds are (-200,-100)..(300,200).
        sync.update_bounds(Some(Rect::from_min_max(
            Pos2::new(-150.0, -50.0),
            Pos2::new(250.0, 150.0),
        )));
        sync.set_viewport(Rect::from_min_size(Pos2::new(0.0, 0.0), vec2(100.0, 60.0)));
        sync
    }

    fn assert_inside(sync: &MinimapSync) {
        let bounds = sync.bounds();
        let viewport = sync.viewport();
        assert!(viewport.min.x >= bounds.min.x - 1e-3);
        assert!(viewport.min.y >= bounds.min.y - 1e-3);
        assert!(viewport.min.x <= bounds.max.x - viewport.width() + 1e-3);
        assert!(viewport.min.y <= bounds.max.y - viewport.height() + 1e-3);
    }

    #[test]
    fn maps_bounds_onto_minimap_both_ways() {
        let sync = synced();
        assert_eq!(sync.bounds().min, Pos2::new(-200.0, -100.0));
        assert_eq!(sync.scale(), vec2(200.0 / 500.0, 100.0 / 300.0));

        let corner = sync.to_minimap(Pos2::new(300.0, 200.0));
        assert!((corner - Pos2::new(200.0, 100.0)).length() < 1e-3);
        let back = sync.to_world(sync.to_minimap(Pos2::new(42.0, -17.0)));
        assert!((back - Pos2::new(42.0, -17.0)).length() < 1e-3);
    }

    #[test]
    fn drag_converts_minimap_delta_through_inverse_scale() {
        let mut sync = synced();
        let moved = sync.drag_viewport(vec2(10.0, 10.0));
        assert!((moved.min - Pos2::new(25.0, 30.0)).length() < 1e-3);
        assert_eq!(moved.size(), vec2(100.0, 60.0));
    }

    #[test]
    fn drag_is_clamped_to_bounds() {
        let mut sync = synced();
        for delta in [vec2(1_000.0, 0.0), vec2(0.0, -1_000.0), vec2(-5_000.0, 5_000.0)] {
            sync.drag_viewport(delta);
            assert_inside(&sync);
        }
        assert_eq!(sync.viewport().min.x, -200.0);
        assert_eq!(sync.viewport().min.y, 200.0 - 60.0);
    }

    #[test]
    fn click_recenters_under_the_same_clamp() {
        let mut sync = synced();
        let clicked = sync.to_minimap(Pos2::new(100.0, 50.0));
        let viewport = sync.center_on(clicked);
        assert!((viewport.center() - Pos2::new(100.0, 50.0)).length() < 1e-3);

        sync.center_on(Pos2::new(0.0, 0.0));
        assert_inside(&sync);
        assert_eq!(sync.viewport().min, sync.bounds().min);

        sync.center_on(Pos2::new(200.0, 100.0));
        assert_inside(&sync);
    }

    #[test]
    fn shrinking_bounds_pulls_viewport_back_inside() {
        let mut sync = synced();
        sync.drag_viewport(vec2(1_000.0, 1_000.0));
        sync.update_bounds(Some(Rect::from_min_max(Pos2::ZERO, Pos2::new(100.0, 100.0))));
        assert_inside(&sync);
        sync.update_bounds(None);
        assert_eq!(sync.bounds().max, Pos2::new(150.0, 150.0));
    }
}
