//! Force-directed layout, advanced one tick per rendered frame.
//!
//! The simulation owns the position table for the current graph snapshot and is the only
//! code that writes to it. A dragged node is held at the pointer position every tick until
//! it is released.

mod forces;
mod quadtree;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::config::LayoutConfig;
use crate::graph::Graph;
use forces::{ChargeParams, CollisionParams, charge_force, resolve_collisions};
use quadtree::QuadTree;

#[derive(Clone, Copy, Debug)]
struct Link {
    source: usize,
    target: usize,
    rest_length: f32,
    strength: f32,
    /// Share of the correction applied to the target end.
    bias: f32,
}

pub struct Simulation {
    config: LayoutConfig,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    pinned: Vec<Option<Vec2>>,
    radii: Vec<f32>,
    charges: Vec<f32>,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    dragging: Option<usize>,
    rng: StdRng,
    scratch: Vec<Vec2>,
}

impl Simulation {
    pub fn new(graph: &Graph, config: LayoutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut simulation = Self {
            positions: Vec::new(),
            velocities: Vec::new(),
            pinned: Vec::new(),
            radii: Vec::new(),
            charges: Vec::new(),
            links: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            dragging: None,
            rng,
            scratch: Vec::new(),
            config,
        };
        simulation.reset(graph);
        simulation
    }

    /// Replaces the node set wholesale and restarts at full energy.
    pub fn reset(&mut self, graph: &Graph) {
        let node_count = graph.node_count();
        let center = self.center();
        let jitter = self.config.initial_jitter.max(0.0);

        self.positions.clear();
        for _ in 0..node_count {
            let offset = if jitter > 0.0 {
                vec2(
                    self.rng.gen_range(-jitter..=jitter),
                    self.rng.gen_range(-jitter..=jitter),
                )
            } else {
                Vec2::ZERO
            };
            self.positions.push(center + offset);
        }

        self.velocities = vec![Vec2::ZERO; node_count];
        self.pinned = vec![None; node_count];
        self.radii = graph
            .nodes()
            .iter()
            .map(|node| self.config.node_radius(node.size))
            .collect();
        self.charges = graph
            .nodes()
            .iter()
            .map(|node| self.config.charge_for(&node.kind))
            .collect();

        let mut degree = vec![0usize; node_count];
        for &(source, target) in graph.endpoints() {
            if source != target {
                degree[source] += 1;
                degree[target] += 1;
            }
        }

        self.links = graph
            .edges()
            .iter()
            .zip(graph.endpoints())
            .filter(|(_, (source, target))| source != target)
            .map(|(edge, &(source, target))| {
                let source_degree = degree[source] as f32;
                let target_degree = degree[target] as f32;
                Link {
                    source,
                    target,
                    rest_length: self.config.link_length(edge.weight),
                    strength: 1.0 / source_degree.min(target_degree).max(1.0),
                    bias: source_degree / (source_degree + target_degree),
                }
            })
            .collect();

        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.dragging = None;
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.config.center[0], self.config.center[1])
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    pub fn radii(&self) -> &[f32] {
        &self.radii
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
    }

    /// Raises the energy so the layout starts moving again.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pinned.get(index).is_some_and(Option::is_some)
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(slot) = self.pinned.get_mut(index) {
            *slot = Some(position);
            self.positions[index] = position;
            self.velocities[index] = Vec2::ZERO;
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(slot) = self.pinned.get_mut(index) {
            *slot = None;
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Takes ownership of `index`'s position away from the forces and re-energizes the rest
    /// of the layout so neighbors follow the drag.
    pub fn begin_drag(&mut self, index: usize, position: Vec2) {
        if index >= self.node_count() {
            return;
        }

        self.dragging = Some(index);
        self.pin(index, position);
        self.alpha_target = self.config.alpha_drag_target;
        self.reheat(self.config.alpha_drag_target);
    }

    pub fn drag_to(&mut self, position: Vec2) {
        if let Some(index) = self.dragging {
            self.pin(index, position);
        }
    }

    /// Returns the dragged node to the forces and lets the energy decay.
    pub fn end_drag(&mut self) {
        if let Some(index) = self.dragging.take() {
            self.unpin(index);
        }
        self.alpha_target = 0.0;
    }

    /// Advances one tick. Returns `false` once the layout has settled.
    pub fn tick(&mut self) -> bool {
        let node_count = self.node_count();
        if node_count == 0 {
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        if self.is_settled() {
            self.hold_pinned();
            return false;
        }

        let alpha = self.alpha;
        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_centering(alpha);
        self.apply_collision();
        self.integrate();
        true
    }

    fn apply_links(&mut self, alpha: f32) {
        let min_distance = self.config.charge_distance_min;
        for link in &self.links {
            let delta = (self.positions[link.target] + self.velocities[link.target])
                - (self.positions[link.source] + self.velocities[link.source]);
            let distance = delta.length().max(min_distance);
            let stretch = (distance - link.rest_length) / distance;
            let correction = delta * (stretch * alpha * link.strength);

            self.velocities[link.target] -= correction * link.bias;
            self.velocities[link.source] += correction * (1.0 - link.bias);
        }
    }

    fn apply_charge(&mut self, alpha: f32) {
        let Some(tree) = QuadTree::build(&self.positions, &self.charges) else {
            return;
        };

        let params = ChargeParams {
            alpha,
            theta: self.config.barnes_hut_theta,
            distance_min_sq: self.config.charge_distance_min.powi(2),
            distance_max_sq: self.config.charge_distance_max.powi(2),
        };
        for (index, velocity) in self.velocities.iter_mut().enumerate() {
            *velocity += charge_force(&tree, index, &self.positions, &self.charges, params);
        }
    }

    fn apply_centering(&mut self, alpha: f32) {
        let center = self.center();
        let pull = self.config.center_strength * alpha;
        for (position, velocity) in self.positions.iter().zip(&mut self.velocities) {
            *velocity += (center - *position) * pull;
        }
    }

    fn apply_collision(&mut self) {
        let margin = self.config.collision_margin;
        let padded = self
            .radii
            .iter()
            .map(|radius| radius + margin)
            .collect::<Vec<_>>();
        let max_radius = padded.iter().copied().fold(0.0_f32, f32::max);
        if max_radius <= 0.0 {
            return;
        }

        let predicted = self
            .positions
            .iter()
            .zip(&self.velocities)
            .map(|(position, velocity)| *position + *velocity)
            .collect::<Vec<_>>();
        let Some(tree) = QuadTree::build(&predicted, &self.charges) else {
            return;
        };

        self.scratch.clear();
        self.scratch.resize(predicted.len(), Vec2::ZERO);
        resolve_collisions(
            &tree,
            &predicted,
            &padded,
            CollisionParams {
                strength: self.config.collision_strength,
                max_radius,
            },
            &mut self.scratch,
        );

        for (velocity, delta) in self.velocities.iter_mut().zip(&self.scratch) {
            *velocity += *delta;
        }
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.config.velocity_decay;
        let max_speed = self.config.max_speed;
        let center = self.center();
        let jitter = self.config.initial_jitter.max(1.0);

        for index in 0..self.positions.len() {
            if let Some(pinned) = self.pinned[index] {
                self.positions[index] = pinned;
                self.velocities[index] = Vec2::ZERO;
                continue;
            }

            let mut velocity = self.velocities[index] * retain;
            let speed = velocity.length();
            if speed > max_speed {
                velocity *= max_speed / speed;
            }

            let next = self.positions[index] + velocity;
            if next.is_finite() && velocity.is_finite() {
                self.velocities[index] = velocity;
                self.positions[index] = next;
            } else {
                warn!(index, "non-finite layout position; re-seeding node near center");
                self.velocities[index] = Vec2::ZERO;
                self.positions[index] = center
                    + vec2(
                        self.rng.gen_range(-jitter..=jitter),
                        self.rng.gen_range(-jitter..=jitter),
                    );
            }
        }
    }

    fn hold_pinned(&mut self) {
        for (position, pinned) in self.positions.iter_mut().zip(&self.pinned) {
            if let Some(pinned) = pinned {
                *position = *pinned;
            }
        }
    }

    /// Bounding box of all node positions, or `None` when there are no nodes.
    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.positions.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for position in rest {
            min = min.min(*position);
            max = max.max(*position);
        }
        Some(Rect::from_min_max(min.to_pos2(), max.to_pos2()))
    }

    /// Topmost node whose disc contains `point`, preferring the closest center.
    pub fn node_at(&self, point: Pos2) -> Option<usize> {
        let point = point.to_vec2();
        self.positions
            .iter()
            .zip(&self.radii)
            .enumerate()
            .filter_map(|(index, (position, radius))| {
                let distance = (*position - point).length();
                (distance <= *radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
