use std::collections::{HashMap, VecDeque};

use crate::graph::Edge;

use super::adjacency;

/// One hop of a path, oriented in path order.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEdge {
    pub source: String,
    pub target: String,
    pub kind: String,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathResult {
    pub found: bool,
    /// Node ids from source to target; empty when not found.
    pub nodes: Vec<String>,
    pub edges: Vec<PathEdge>,
    /// Unique relation types in the order they occur along the path.
    pub relation_types: Vec<String>,
}

impl PathResult {
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Number of nodes on the path. A single-node path has length 1.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node == id)
    }

    /// Whether `edge` joins two consecutive path nodes, in either direction.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        self.nodes
            .windows(2)
            .any(|pair| edge.connects(&pair[0], &pair[1]))
    }
}

/// `HAS_SKILL` -> `Has Skill`.
pub fn humanize_relation(kind: &str) -> String {
    kind.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Undirected breadth-first shortest path.
///
/// Among equal-length paths the one reached first in edge order wins.
pub fn shortest_path(source: &str, target: &str, edges: &[Edge]) -> PathResult {
    if source == target {
        return PathResult {
            found: true,
            nodes: vec![source.to_owned()],
            ..PathResult::default()
        };
    }

    let adjacency = adjacency(edges);
    let mut parent: HashMap<&str, (&str, usize)> = HashMap::new();
    let mut queue = VecDeque::from([source]);

    'search: while let Some(node_id) = queue.pop_front() {
        let Some(neighbors) = adjacency.get(node_id) else {
            continue;
        };

        for &(next_id, edge_index) in neighbors {
            if next_id == source || parent.contains_key(next_id) {
                continue;
            }

            parent.insert(next_id, (node_id, edge_index));
            if next_id == target {
                break 'search;
            }
            queue.push_back(next_id);
        }
    }

    if !parent.contains_key(target) {
        return PathResult::not_found();
    }

    let mut nodes = vec![target.to_owned()];
    let mut hops = Vec::new();
    let mut cursor = target;
    while cursor != source {
        let Some(&(prev, edge_index)) = parent.get(cursor) else {
            return PathResult::not_found();
        };
        hops.push((prev, cursor, edge_index));
        nodes.push(prev.to_owned());
        cursor = prev;
    }
    nodes.reverse();
    hops.reverse();

    let mut relation_types: Vec<String> = Vec::new();
    let path_edges = hops
        .into_iter()
        .map(|(from, to, edge_index)| {
            let kind = edges[edge_index].kind.clone();
            if !relation_types.contains(&kind) {
                relation_types.push(kind.clone());
            }
            PathEdge {
                source: from.to_owned(),
                target: to.to_owned(),
                label: edges[edge_index]
                    .label
                    .clone()
                    .unwrap_or_else(|| humanize_relation(&kind)),
                kind,
            }
        })
        .collect();

    PathResult {
        found: true,
        nodes,
        edges: path_edges,
        relation_types,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::distances_from;
    use crate::traversal::fixtures::{chain, edge};

    #[test]
    fn walks_the_chain_end_to_end() {
        let result = shortest_path("A", "D", &chain());
        assert!(result.found);
        assert_eq!(result.nodes, ["A", "B", "C", "D"]);
        assert_eq!(result.len(), 4);
        assert_eq!(result.edges.len(), 3);
        assert_eq!(result.edges[1].source, "B");
        assert_eq!(result.edges[1].target, "C");
        assert_eq!(result.relation_types, ["CONNECTED_TO"]);
    }

    #[test]
    fn ignores_declared_edge_direction() {
        let result = shortest_path("D", "A", &chain());
        assert_eq!(result.nodes, ["D", "C", "B", "A"]);
        assert_eq!(result.edges[0].source, "D");
    }

    #[test]
    fn same_node_is_a_single_node_path() {
        let result = shortest_path("A", "A", &chain());
        assert!(result.found);
        assert_eq!(result.nodes, ["A"]);
        assert_eq!(result.len(), 1);
        assert!(result.edges.is_empty());

        let detached = shortest_path("Q", "Q", &[]);
        assert!(detached.found);
        assert_eq!(detached.len(), 1);
    }

    #[test]
    fn removing_the_bridge_disconnects() {
        let edges = vec![edge("A", "B"), edge("C", "D")];
        let result = shortest_path("A", "D", &edges);
        assert!(!result.found);
        assert!(result.nodes.is_empty());
        assert!(result.edges.is_empty());
    }

    #[test]
    fn length_matches_distance_map_plus_one() {
        let edges = vec![
            edge("A", "B"),
            edge("B", "C"),
            edge("A", "E"),
            edge("E", "F"),
            edge("F", "C"),
            edge("C", "D"),
            edge("D", "G"),
            edge("B", "G"),
        ];
        let distances = distances_from("A", &edges);
        for (target, hops) in &distances {
            let result = shortest_path("A", target, &edges);
            assert!(result.found, "{target} should be reachable");
            assert_eq!(result.len(), hops + 1, "length mismatch for {target}");
        }
    }

    #[test]
    fn records_unique_relation_types_in_path_order() {
        let mut edges = vec![edge("A", "B"), edge("B", "C"), edge("C", "D")];
        edges[1].kind = "HAS_SKILL".to_owned();
        let result = shortest_path("A", "D", &edges);
        assert_eq!(result.relation_types, ["CONNECTED_TO", "HAS_SKILL"]);
        assert_eq!(result.edges[1].label, "Has Skill");
    }

    #[test]
    fn path_membership_checks_consecutive_pairs() {
        let edges = chain();
        let result = shortest_path("A", "C", &edges);
        assert!(result.contains_edge(&edges[0]));
        assert!(result.contains_edge(&edge("C", "B")));
        assert!(!result.contains_edge(&edges[2]));
        assert!(result.contains_node("B"));
    }

    #[test]
    fn humanizes_relation_types() {
        assert_eq!(humanize_relation("CONNECTED_TO"), "Connected To");
        assert_eq!(humanize_relation("LEADS_TO"), "Leads To");
        assert_eq!(humanize_relation(""), "");
    }
}
