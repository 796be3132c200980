use serde_json::json;

use crate::graph::{Edge, GraphMetadata, Node, induced_edges};

use super::{SearchResult, score};

/// Ranked search hits, their induced edges and the per-type summary.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub results: Vec<SearchResult>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn metadata(&self) -> GraphMetadata {
        GraphMetadata::describe(&self.nodes, &self.edges)
    }
}

/// Scores every node against `query`, keeps the positive ones ranked by
/// score (ties keep input order) and keeps the edges between survivors.
pub fn select(nodes: &[Node], edges: &[Edge], query: &str) -> Selection {
    let mut ranked = nodes
        .iter()
        .filter_map(|node| {
            let match_score = score(&node.label, node.node_type.as_str(), query);
            (match_score > 0.0).then(|| {
                let mut node = node.clone();
                node.match_score = Some(match_score);
                node
            })
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| {
        let a = a.match_score.unwrap_or_default();
        let b = b.match_score.unwrap_or_default();
        b.total_cmp(&a)
    });

    let edges = induced_edges(&ranked, edges);
    let results = group_by_type(&ranked);

    Selection {
        nodes: ranked,
        edges,
        results,
    }
}

/// One `"<type> (<count>)"` entry per node type, in rank order of each type's
/// best member, scored with that member's match score.
pub fn group_by_type(ranked: &[Node]) -> Vec<SearchResult> {
    let mut groups: Vec<(String, usize, f32)> = Vec::new();
    for node in ranked {
        let kind = node.node_type.to_string();
        match groups.iter_mut().find(|(existing, _, _)| *existing == kind) {
            Some((_, count, _)) => *count += 1,
            None => groups.push((kind, 1, node.match_score.unwrap_or_default())),
        }
    }

    groups
        .into_iter()
        .map(|(kind, count, best)| SearchResult {
            text: format!("{kind} ({count})"),
            score: best,
            metadata: Some(json!({ "type": kind, "count": count })),
        })
        .collect()
}
