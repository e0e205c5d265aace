//! Tunable engine parameters.
//!
//! Every section deserializes with defaults, so a config file only needs the keys it changes.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::graph::NodeType;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub cluster: HullConfig,
    pub minimap: MinimapConfig,
    pub overlay: OverlayConfig,
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|error| Error::Config(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let layout = &self.layout;
        check(layout.link_distance > 0.0, "layout.link_distance must be positive")?;
        check(
            (0.0..1.0).contains(&layout.link_weight_shortening),
            "layout.link_weight_shortening must be in [0, 1)",
        )?;
        check(
            layout.charge_distance_min > 0.0,
            "layout.charge_distance_min must be positive",
        )?;
        check(
            layout.charge_distance_max > layout.charge_distance_min,
            "layout.charge_distance_max must exceed charge_distance_min",
        )?;
        check(
            layout.alpha_min > 0.0 && layout.alpha_min < 1.0,
            "layout.alpha_min must be in (0, 1)",
        )?;
        check(
            layout.alpha_decay > 0.0 && layout.alpha_decay < 1.0,
            "layout.alpha_decay must be in (0, 1)",
        )?;
        check(
            (0.0..1.0).contains(&layout.alpha_drag_target),
            "layout.alpha_drag_target must be in [0, 1)",
        )?;
        check(
            (0.0..1.0).contains(&layout.velocity_decay),
            "layout.velocity_decay must be in [0, 1)",
        )?;
        check(layout.node_radius_base > 0.0, "layout.node_radius_base must be positive")?;
        check(layout.max_speed > 0.0, "layout.max_speed must be positive")?;
        check(self.cluster.padding >= 0.0, "cluster.padding must not be negative")?;
        check(self.cluster.min_members >= 3, "cluster.min_members must be at least 3")?;
        check(
            self.minimap.width > 0.0 && self.minimap.height > 0.0,
            "minimap size must be positive",
        )?;
        check(self.minimap.padding >= 0.0, "minimap.padding must not be negative")?;
        for (name, value) in [
            ("overlay.hover_node_opacity", self.overlay.hover_node_opacity),
            ("overlay.hover_edge_opacity", self.overlay.hover_edge_opacity),
            ("overlay.path_dim_opacity", self.overlay.path_dim_opacity),
            ("overlay.local_fade_floor", self.overlay.local_fade_floor),
        ] {
            check((0.0..=1.0).contains(&value), &format!("{name} must be in [0, 1]"))?;
        }
        Ok(())
    }
}

fn check(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Config(message.to_owned()))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Spring rest length for an unweighted edge.
    pub link_distance: f32,
    /// Rest length becomes `link_distance * (1 - weight * link_weight_shortening)`.
    pub link_weight_shortening: f32,
    /// Charge for types missing from `charge_by_type`. Negative values repel.
    pub default_charge: f32,
    pub charge_by_type: HashMap<String, f32>,
    pub charge_distance_min: f32,
    pub charge_distance_max: f32,
    pub barnes_hut_theta: f32,
    pub center: [f32; 2],
    pub center_strength: f32,
    pub collision_margin: f32,
    pub collision_strength: f32,
    pub node_radius_base: f32,
    pub node_radius_scale: f32,
    pub node_radius_max: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub alpha_drag_target: f32,
    pub velocity_decay: f32,
    pub max_speed: f32,
    pub initial_jitter: f32,
    pub seed: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let charge_by_type = [
            ("user", -300.0),
            ("community", -520.0),
            ("company", -520.0),
            ("skill", -180.0),
            ("event", -220.0),
            ("project", -220.0),
            ("search", -260.0),
        ]
        .into_iter()
        .map(|(kind, charge)| (kind.to_owned(), charge))
        .collect();

        Self {
            link_distance: 150.0,
            link_weight_shortening: 0.5,
            default_charge: -250.0,
            charge_by_type,
            charge_distance_min: 1.0,
            charge_distance_max: 2_000.0,
            barnes_hut_theta: 0.72,
            center: [0.0, 0.0],
            center_strength: 0.05,
            collision_margin: 4.0,
            collision_strength: 0.7,
            node_radius_base: 6.0,
            node_radius_scale: 4.0,
            node_radius_max: 40.0,
            alpha_min: 0.001,
            // Settles in roughly 300 ticks.
            alpha_decay: 1.0 - 0.001_f32.powf(1.0 / 300.0),
            alpha_drag_target: 0.3,
            velocity_decay: 0.4,
            max_speed: 80.0,
            initial_jitter: 50.0,
            seed: None,
        }
    }
}

impl LayoutConfig {
    pub fn charge_for(&self, kind: &NodeType) -> f32 {
        self.charge_by_type
            .get(kind.as_str())
            .copied()
            .unwrap_or(self.default_charge)
    }

    /// Rendered radius for a node with the given size hint.
    pub fn node_radius(&self, size: Option<f32>) -> f32 {
        let size = size.unwrap_or(1.0).max(0.0);
        (self.node_radius_base + size.sqrt() * self.node_radius_scale)
            .min(self.node_radius_max.max(self.node_radius_base))
    }

    pub fn link_length(&self, weight: Option<f32>) -> f32 {
        let weight = weight.unwrap_or(0.0).clamp(0.0, 1.0);
        self.link_distance * (1.0 - weight * self.link_weight_shortening)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HullConfig {
    /// Outward expansion of each hull vertex from the hull centroid.
    pub padding: f32,
    pub min_members: usize,
}

impl Default for HullConfig {
    fn default() -> Self {
        Self {
            padding: 30.0,
            min_members: 3,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MinimapConfig {
    pub width: f32,
    pub height: f32,
    /// Added around the node bounding box before mapping it onto the minimap.
    pub padding: f32,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 150.0,
            padding: 50.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub hover_node_opacity: f32,
    pub hover_edge_opacity: f32,
    pub path_dim_opacity: f32,
    pub local_fade_floor: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hover_node_opacity: 0.2,
            hover_edge_opacity: 0.1,
            path_dim_opacity: 0.3,
            local_fade_floor: 0.15,
        }
    }
}
