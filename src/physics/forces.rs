use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadTree;

/// Below this separation two nodes are treated as coincident.
const COINCIDENT_DISTANCE: f32 = 1e-4;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) alpha: f32,
    pub(super) theta: f32,
    pub(super) distance_min_sq: f32,
    pub(super) distance_max_sq: f32,
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
    pub(super) max_radius: f32,
}

/// Deterministic unit direction for separating two coincident nodes.
pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

fn charge_between(
    point: Vec2,
    other: Vec2,
    other_charge: f32,
    params: ChargeParams,
    pair: (usize, usize),
) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq >= params.distance_max_sq {
        return Vec2::ZERO;
    }

    if distance_sq < COINCIDENT_DISTANCE * COINCIDENT_DISTANCE {
        // `other - point` carries no direction here; both ends of the pair pick the same
        // axis with opposite signs.
        let axis = jiggle(pair.0.min(pair.1), pair.0.max(pair.1));
        let sign = if pair.0 < pair.1 { 1.0 } else { -1.0 };
        delta = axis * sign * params.distance_min_sq.sqrt();
        distance_sq = delta.length_sq();
    }

    let distance_sq = distance_sq.max(params.distance_min_sq);
    delta * (other_charge * params.alpha / distance_sq)
}

/// Force on `index` from every other node, approximating far cells by their centroid.
pub(super) fn charge_force(
    tree: &QuadTree,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: ChargeParams,
) -> Vec2 {
    let point = positions[index];
    let min_distance = params.distance_min_sq.sqrt();
    let mut force = Vec2::ZERO;

    tree.visit(|cell| {
        if cell.charge == 0.0 {
            return false;
        }

        if cell.is_leaf() {
            for &other in tree.members(cell) {
                if other != index {
                    force += charge_between(
                        point,
                        positions[other],
                        charges[other],
                        params,
                        (index, other),
                    );
                }
            }
            return false;
        }

        let distance = (cell.centroid - point).length().max(min_distance);
        let far = !cell.square.contains(point) && cell.square.side() / distance < params.theta;
        if far && cell.len() > 1 {
            force += charge_between(point, cell.centroid, cell.charge, params, (index, usize::MAX));
            return false;
        }
        true
    });
    force
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to];
    let delta = positions[from] - positions[to];
    let distance = delta.length();
    if distance >= min_distance {
        return;
    }

    let direction = if distance > COINCIDENT_DISTANCE {
        delta / distance
    } else {
        jiggle(from, to)
    };
    let overlap = (min_distance - distance) * params.strength;
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq).max(f32::EPSILON);

    deltas[from] += direction * overlap * share;
    deltas[to] -= direction * overlap * (1.0 - share);
}

/// Pushes apart every overlapping pair once, skipping cells farther than the
/// largest possible contact distance.
pub(super) fn resolve_collisions(
    tree: &QuadTree,
    positions: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    for (index, &point) in positions.iter().enumerate() {
        let reach = radii[index] + params.max_radius;
        tree.visit(|cell| {
            if cell.square.distance_sq_to(point) > reach * reach {
                return false;
            }
            if cell.is_leaf() {
                for &other in tree.members(cell) {
                    if other > index {
                        separate_pair(index, other, positions, radii, params, deltas);
                    }
                }
                return false;
            }
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChargeParams {
        ChargeParams {
            alpha: 1.0,
            theta: 0.72,
            distance_min_sq: 1.0,
            distance_max_sq: 1.0e6,
        }
    }

    #[test]
    fn negative_charge_pushes_apart() {
        let push = charge_between(vec2(0.0, 0.0), vec2(10.0, 0.0), -100.0, params(), (0, 1));
        assert!(push.x < 0.0);
        assert!(push.y.abs() < 1e-6);
    }

    #[test]
    fn coincident_nodes_get_a_finite_push() {
        let push = charge_between(vec2(3.0, 3.0), vec2(3.0, 3.0), -300.0, params(), (0, 1));
        assert!(push.is_finite());
        assert!(push.length() > 0.0);
    }

    #[test]
    fn overlapping_pair_separates() {
        let positions = [vec2(0.0, 0.0), vec2(1.0, 0.0)];
        let radii = [5.0, 5.0];
        let mut deltas = [Vec2::ZERO; 2];
        let tree = QuadTree::build(&positions, &[-1.0, -1.0]).unwrap();
        resolve_collisions(
            &tree,
            &positions,
            &radii,
            CollisionParams {
                strength: 1.0,
                max_radius: 5.0,
            },
            &mut deltas,
        );

        assert!(deltas[0].x < 0.0);
        assert!(deltas[1].x > 0.0);
        assert!((deltas[0].x + deltas[1].x).abs() < 1e-4);
    }

    #[test]
    fn far_cells_are_approximated_close_to_exact_sum() {
        let mut positions = (0..40)
            .map(|index| vec2(200.0 + (index % 8) as f32 * 3.0, (index / 8) as f32 * 3.0))
            .collect::<Vec<_>>();
        positions.push(vec2(0.0, 0.0));
        let charges = vec![-30.0; positions.len()];
        let probe = positions.len() - 1;
        let tree = QuadTree::build(&positions, &charges).unwrap();

        let approximate = charge_force(&tree, probe, &positions, &charges, params());
        let exact = (0..probe)
            .map(|other| {
                let pair = (probe, other);
                charge_between(positions[probe], positions[other], charges[other], params(), pair)
            })
            .fold(Vec2::ZERO, |sum, force| sum + force);
        assert!(approximate.x < 0.0);
        assert!((approximate - exact).length() < exact.length() * 0.1);
    }
}
