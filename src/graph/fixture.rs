use super::{Edge, Node, NodeType};

const NODES: [(&str, &str, f32, &str); 9] = [
    ("1", "Pension Plans", 25.0, "plan_type"),
    ("2", "Defined Benefit", 20.0, "plan_type"),
    ("3", "Defined Contribution", 20.0, "plan_type"),
    ("4", "Manufacturing", 15.0, "industry"),
    ("5", "Technology", 15.0, "industry"),
    ("6", "Healthcare", 15.0, "industry"),
    ("7", "Vesting", 10.0, "feature"),
    ("8", "Contribution Matching", 10.0, "feature"),
    ("9", "Early Retirement", 10.0, "feature"),
];

const EDGES: [(&str, &str, &str, f32); 8] = [
    ("1", "2", "includes", 2.0),
    ("1", "3", "includes", 2.0),
    ("2", "4", "common in", 1.0),
    ("3", "5", "popular in", 1.0),
    ("2", "6", "found in", 1.0),
    ("2", "9", "offers", 1.0),
    ("3", "7", "requires", 1.0),
    ("3", "8", "features", 1.0),
];

/// The static pension knowledge graph served in fixture mode.
///
/// Fixture nodes have no precomputed clusters, so the community is the type
/// index and the degree is derived from the display size.
pub fn pension_fixture() -> (Vec<Node>, Vec<Edge>) {
    let nodes = NODES
        .iter()
        .map(|&(id, label, size, kind)| {
            let node_type = NodeType::from(kind);
            let community = node_type.fixture_community();
            Node::new(id, label, node_type, size)
                .with_community(community)
                .with_degree(((size / 5.0).round() as u32).max(1))
        })
        .collect();

    let edges = EDGES
        .iter()
        .enumerate()
        .map(|(index, &(source, target, label, weight))| {
            Edge::new(format!("e{index}"), source, target, label).with_weight(weight)
        })
        .collect();

    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::super::induced_edges;
    use super::*;

    #[test]
    fn fixture_is_self_consistent() {
        let (nodes, edges) = pension_fixture();
        assert_eq!(nodes.len(), 9);
        assert_eq!(edges.len(), 8);
        assert_eq!(induced_edges(&nodes, &edges).len(), edges.len());
        assert_eq!(nodes[0].community, 0);
        assert_eq!(nodes[3].community, 1);
        assert_eq!(nodes[6].community, 2);
        assert_eq!(nodes[0].degree, 5);
        assert_eq!(edges[0].weight, 2.0);
    }
}
