use std::collections::BTreeSet;

use super::{Edge, Node, induced_edges};

/// Restricts a node/edge set to one community. `None` passes everything through.
pub fn filter_community(
    nodes: &[Node],
    edges: &[Edge],
    community: Option<u32>,
) -> (Vec<Node>, Vec<Edge>) {
    let Some(community) = community else {
        return (nodes.to_vec(), edges.to_vec());
    };

    let kept = nodes
        .iter()
        .filter(|node| node.community == community)
        .cloned()
        .collect::<Vec<_>>();
    let edges = induced_edges(&kept, edges);
    (kept, edges)
}

/// Sorted distinct community ids present in `nodes`.
pub fn communities(nodes: &[Node]) -> Vec<u32> {
    nodes
        .iter()
        .map(|node| node.community)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn sample() -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            Node::new("1", "Pension Plans", "plan_type", 25.0).with_community(0),
            Node::new("2", "Manufacturing", "industry", 15.0).with_community(1),
            Node::new("3", "Vesting", "feature", 10.0).with_community(1),
        ];
        let edges = vec![
            Edge::new("e0", "1", "2", "common in"),
            Edge::new("e1", "2", "3", "requires"),
        ];
        (nodes, edges)
    }

    #[test]
    fn none_passes_through() {
        let (nodes, edges) = sample();
        let (kept_nodes, kept_edges) = filter_community(&nodes, &edges, None);
        assert_eq!(kept_nodes, nodes);
        assert_eq!(kept_edges, edges);
    }

    #[test]
    fn keeps_members_and_internal_edges_only() {
        let (nodes, edges) = sample();
        let (kept_nodes, kept_edges) = filter_community(&nodes, &edges, Some(1));

        let ids = kept_nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["2", "3"]);
        assert_eq!(kept_edges.len(), 1);
        assert_eq!(kept_edges[0].id, "e1");
    }

    #[test]
    fn unknown_community_yields_empty_set() {
        let (nodes, edges) = sample();
        let (kept_nodes, kept_edges) = filter_community(&nodes, &edges, Some(9));
        assert!(kept_nodes.is_empty());
        assert!(kept_edges.is_empty());
    }

    #[test]
    fn lists_distinct_communities_in_order() {
        let (nodes, _) = sample();
        assert_eq!(communities(&nodes), vec![0, 1]);
    }

    #[test]
    fn filtered_edges_always_have_both_endpoints() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..64 {
            let count = rng.gen_range(0..24);
            let nodes = (0..count)
                .map(|i| {
                    Node::new(i.to_string(), format!("node {i}"), "feature", 5.0)
                        .with_community(rng.gen_range(0..4))
                })
                .collect::<Vec<_>>();
            let edges = (0..count * 2)
                .map(|i| {
                    Edge::new(
                        format!("e{i}"),
                        rng.gen_range(0..count + 4).to_string(),
                        rng.gen_range(0..count + 4).to_string(),
                        "rel",
                    )
                })
                .collect::<Vec<_>>();

            let community = rng.gen_range(0..4);
            let (kept_nodes, kept_edges) = filter_community(&nodes, &edges, Some(community));
            assert!(kept_nodes.iter().all(|node| node.community == community));
            for edge in &kept_edges {
                assert!(kept_nodes.iter().any(|node| node.id == edge.source));
                assert!(kept_nodes.iter().any(|node| node.id == edge.target));
            }
        }
    }
}
