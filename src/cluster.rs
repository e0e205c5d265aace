//! Padded convex-hull boundaries around cluster members.
//!
//! Hulls are derived from the current position table on demand and never stored.

use std::collections::BTreeMap;

use eframe::egui::Vec2;

use crate::config::HullConfig;
use crate::graph::Graph;

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterHull {
    pub cluster: u32,
    pub members: Vec<usize>,
    /// Counter-clockwise (in y-up terms) polygon, already padded.
    pub polygon: Vec<Vec2>,
    pub centroid: Vec2,
}

/// Node indices grouped by cluster id, in ascending cluster order.
pub fn cluster_members(graph: &Graph) -> BTreeMap<u32, Vec<usize>> {
    let mut members: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, node) in graph.nodes().iter().enumerate() {
        if let Some(cluster) = node.cluster {
            members.entry(cluster).or_default().push(index);
        }
    }
    members
}

/// One padded hull per cluster with at least `max(min_size, config.min_members)` members.
/// Smaller clusters, and clusters whose members are all collinear, are skipped.
pub fn compute_hulls(
    graph: &Graph,
    positions: &[Vec2],
    config: &HullConfig,
    min_size: usize,
) -> Vec<ClusterHull> {
    let min_members = min_size.max(config.min_members).max(3);

    cluster_members(graph)
        .into_iter()
        .filter(|(_, members)| members.len() >= min_members)
        .filter_map(|(cluster, members)| {
            let points = members
                .iter()
                .filter_map(|&index| positions.get(index).copied())
                .filter(|point| point.is_finite())
                .collect::<Vec<_>>();
            let hull = convex_hull(&points);
            if hull.len() < 3 {
                return None;
            }

            let centroid = vertex_centroid(&hull);
            Some(ClusterHull {
                cluster,
                members,
                polygon: expand_hull(&hull, centroid, config.padding),
                centroid,
            })
        })
        .collect()
}

fn cross(origin: Vec2, a: Vec2, b: Vec2) -> f32 {
    let oa = a - origin;
    let ob = b - origin;
    (oa.x * ob.y) - (oa.y * ob.x)
}

/// Andrew's monotone chain. Collinear points are dropped from the result.
pub fn convex_hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in &sorted {
        while let &[.., a, b] = lower.as_slice()
            && cross(a, b, point) <= 0.0
        {
            lower.pop();
        }
        lower.push(point);
    }

    let mut upper: Vec<Vec2> = Vec::with_capacity(sorted.len());
    for &point in sorted.iter().rev() {
        while let &[.., a, b] = upper.as_slice()
            && cross(a, b, point) <= 0.0
        {
            upper.pop();
        }
        upper.push(point);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn vertex_centroid(points: &[Vec2]) -> Vec2 {
    let sum = points.iter().fold(Vec2::ZERO, |sum, point| sum + *point);
    sum / points.len().max(1) as f32
}

/// Pushes every vertex `padding` units further from `centroid`.
pub fn expand_hull(hull: &[Vec2], centroid: Vec2, padding: f32) -> Vec<Vec2> {
    hull.iter()
        .map(|&vertex| {
            let offset = vertex - centroid;
            let distance = offset.length();
            if distance > f32::EPSILON {
                vertex + offset * (padding / distance)
            } else {
                vertex
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use serde_json::json;

    use super::*;
    use crate::graph::GraphPayload;

    fn clustered_graph() -> Graph {
        let payload: GraphPayload = serde_json::from_value(json!({
            "nodes": [
                { "id": "a", "type": "user", "label": "a", "cluster": 1 },
                { "id": "b", "type": "user", "label": "b", "cluster": 1 },
                { "id": "c", "type": "user", "label": "c", "cluster": 1 },
                { "id": "d", "type": "user", "label": "d", "cluster": 2 },
                { "id": "e", "type": "user", "label": "e", "cluster": 2 },
                { "id": "f", "type": "skill", "label": "f" }
            ],
            "edges": []
        }))
        .unwrap();
        Graph::from_payload(payload)
    }

    fn positions() -> Vec<Vec2> {
        vec![
            vec2(0.0, 0.0),
            vec2(100.0, 0.0),
            vec2(50.0, 80.0),
            vec2(300.0, 300.0),
            vec2(320.0, 310.0),
            vec2(-50.0, -50.0),
        ]
    }

    #[test]
    fn only_clusters_with_three_members_get_hulls() {
        let hulls = compute_hulls(&clustered_graph(), &positions(), &HullConfig::default(), 0);
        assert_eq!(hulls.len(), 1);
        assert_eq!(hulls[0].cluster, 1);
        assert_eq!(hulls[0].members, [0, 1, 2]);
        assert_eq!(hulls[0].polygon.len(), 3);
    }

    #[test]
    fn min_size_filters_further() {
        let hulls = compute_hulls(&clustered_graph(), &positions(), &HullConfig::default(), 4);
        assert!(hulls.is_empty());
    }

    #[test]
    fn padding_moves_vertices_out_from_centroid() {
        let hulls = compute_hulls(&clustered_graph(), &positions(), &HullConfig::default(), 0);
        let hull = &hulls[0];
        for (padded, original) in hull.polygon.iter().zip(convex_hull(&positions()[..3])) {
            let before = (original - hull.centroid).length();
            let after = (*padded - hull.centroid).length();
            assert!((after - before - 30.0).abs() < 1e-3);
        }
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let points = [
            vec2(0.0, 0.0),
            vec2(10.0, 0.0),
            vec2(5.0, 0.0),
            vec2(10.0, 10.0),
            vec2(0.0, 10.0),
            vec2(5.0, 5.0),
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&vec2(5.0, 5.0)));
        assert!(!hull.contains(&vec2(5.0, 0.0)));
    }

    #[test]
    fn collinear_cluster_is_skipped() {
        let mut line = positions();
        line[2] = vec2(50.0, 0.0);
        let hulls = compute_hulls(&clustered_graph(), &line, &HullConfig::default(), 0);
        assert!(hulls.is_empty());
    }
}
