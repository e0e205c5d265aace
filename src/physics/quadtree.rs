use std::ops::Range;

use eframe::egui::Vec2;

const LEAF_SIZE: usize = 12;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square covered by one cell.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        if points.is_empty() || !points.iter().all(|point| point.is_finite()) {
            return None;
        }

        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        Some(Self {
            center: (min + max) * 0.5,
            half: (max - min).max_elem().max(1.0) * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half && offset.y <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Squared distance from `point` to the nearest point of the square.
    pub(super) fn distance_sq_to(self, point: Vec2) -> f32 {
        ((point - self.center).abs() - Vec2::splat(self.half))
            .max(Vec2::ZERO)
            .length_sq()
    }

    /// Quadrants are numbered with bit 0 for the right half and bit 1 for the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let half = self.half * 0.5;
        let step = |bit: usize| if quadrant & bit == 0 { -half } else { half };
        Self {
            center: self.center + Vec2::new(step(1), step(2)),
            half,
        }
    }
}

/// One cell of the tree. `charge` sums every member below it and `centroid`
/// is weighted by charge magnitude.
#[derive(Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) centroid: Vec2,
    pub(super) charge: f32,
    members: Range<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn len(&self) -> usize {
        self.members.len()
    }
}

/// Barnes-Hut tree stored as a flat arena. Members of a cell are a contiguous
/// run of `order`, so leaves and whole subtrees are plain slices.
#[derive(Debug)]
pub(super) struct QuadTree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl QuadTree {
    /// `None` when there are no points or any of them is not finite.
    pub(super) fn build(positions: &[Vec2], charges: &[f32]) -> Option<Self> {
        let root = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() / LEAF_SIZE * 2 + 1),
            order: (0..positions.len()).collect(),
        };
        tree.subdivide(root, 0..positions.len(), positions, charges, 0);
        Some(tree)
    }

    fn subdivide(
        &mut self,
        square: Square,
        members: Range<usize>,
        positions: &[Vec2],
        charges: &[f32],
        depth: usize,
    ) -> usize {
        let mut weighted = Vec2::ZERO;
        let mut weight = 0.0;
        let mut charge = 0.0;
        for &index in &self.order[members.clone()] {
            weighted += positions[index] * charges[index].abs();
            weight += charges[index].abs();
            charge += charges[index];
        }

        let id = self.cells.len();
        self.cells.push(Cell {
            square,
            centroid: if weight > 0.0 {
                weighted / weight
            } else {
                square.center
            },
            charge,
            members: members.clone(),
            children: [None; 4],
        });
        if depth >= MAX_DEPTH || members.len() <= LEAF_SIZE {
            return id;
        }

        self.order[members.clone()].sort_by_key(|&index| square.quadrant(positions[index]));
        let mut start = members.start;
        let spans: [Range<usize>; 4] = std::array::from_fn(|quadrant| {
            let len = self.order[start..members.end]
                .iter()
                .take_while(|&&index| square.quadrant(positions[index]) == quadrant)
                .count();
            start += len;
            start - len..start
        });

        for (quadrant, span) in spans.into_iter().enumerate() {
            if span.is_empty() {
                continue;
            }
            let child = self.subdivide(square.child(quadrant), span, positions, charges, depth + 1);
            self.cells[id].children[quadrant] = Some(child);
        }
        id
    }

    #[cfg(test)]
    fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub(super) fn members(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.members.clone()]
    }

    /// Pre-order walk. Children are entered only when `enter` returns true.
    pub(super) fn visit(&self, mut enter: impl FnMut(&Cell) -> bool) {
        let mut stack = vec![0];
        while let Some(id) = stack.pop() {
            let cell = &self.cells[id];
            if enter(cell) {
                stack.extend(cell.children.iter().rev().flatten());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn grid() -> Vec<Vec2> {
        (0..64)
            .map(|index| vec2((index % 8) as f32 * 10.0, (index / 8) as f32 * 10.0))
            .collect()
    }

    #[test]
    fn splits_large_sets_and_keeps_totals() {
        let positions = grid();
        let charges = vec![-2.0; positions.len()];
        let tree = QuadTree::build(&positions, &charges).unwrap();
        let root = tree.root();

        assert!(!root.is_leaf());
        assert_eq!(root.len(), 64);
        assert!((root.charge + 128.0).abs() < 1e-3);
        assert!((root.centroid - vec2(35.0, 35.0)).length() < 1e-3);
        assert!(positions.iter().all(|point| root.square.contains(*point)));
    }

    #[test]
    fn leaves_partition_every_point_inside_their_square() {
        let positions = grid();
        let tree = QuadTree::build(&positions, &vec![-1.0; positions.len()]).unwrap();

        let mut seen = Vec::new();
        tree.visit(|cell| {
            if cell.is_leaf() {
                for &index in tree.members(cell) {
                    assert!(cell.square.contains(positions[index]));
                    seen.push(index);
                }
            }
            true
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn coincident_points_stop_at_max_depth() {
        let positions = vec![vec2(4.0, 4.0); 40];
        let tree = QuadTree::build(&positions, &vec![-1.0; 40]).unwrap();
        let mut depth_cells = 0;
        tree.visit(|_| {
            depth_cells += 1;
            true
        });
        assert_eq!(depth_cells, MAX_DEPTH + 1);
    }

    #[test]
    fn refuses_non_finite_positions() {
        let positions = [vec2(0.0, 0.0), vec2(f32::NAN, 1.0)];
        assert!(QuadTree::build(&positions, &[-1.0, -1.0]).is_none());
        assert!(QuadTree::build(&[], &[]).is_none());
    }
}
