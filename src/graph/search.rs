use std::collections::HashMap;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::{Graph, GraphMetadata};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Builds a standalone query-result graph: the best `limit` label matches for `query` and
/// the edges running between them. The result is a new snapshot, not a view onto `graph`.
pub fn query_graph(graph: &Graph, query: &str, limit: usize) -> Graph {
    let query = query.trim();
    let mut result = Graph {
        metadata: GraphMetadata {
            query: Some(query.to_owned()),
            view_type: Some("search".to_owned()),
            ..GraphMetadata::default()
        },
        clusters: graph.clusters.clone(),
        ..Graph::default()
    };
    if query.is_empty() || limit == 0 {
        return result;
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let by_label = fuzzy_match_score(&matcher, &node.label, query);
            let by_id = fuzzy_match_score(&matcher, &node.id, query);
            by_label.max(by_id).map(|score| (index, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(limit);

    let mut remap = HashMap::with_capacity(scored.len());
    for (index, _) in scored {
        let node = graph.nodes[index].clone();
        remap.insert(index, result.nodes.len());
        result.index_by_id.insert(node.id.clone(), result.nodes.len());
        result.nodes.push(node);
    }

    for (edge, &(source, target)) in graph.edges.iter().zip(&graph.endpoints) {
        if let (Some(&source), Some(&target)) = (remap.get(&source), remap.get(&target)) {
            result.edges.push(edge.clone());
            result.endpoints.push((source, target));
        }
    }

    result.metadata.total_nodes = result.nodes.len();
    result.metadata.total_edges = result.edges.len();
    result
}
