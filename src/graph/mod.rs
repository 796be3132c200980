mod community;
mod fixture;
mod store;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use community::{communities, filter_community};
pub use fixture::pension_fixture;
pub use store::GraphStore;

pub type NodeId = String;

/// Semantic category of a node; drives scoring and the vertical layout band.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    PlanType,
    Industry,
    Feature,
    /// Anything else, keeping the raw wire text. Empty when the source sent no type.
    Other(String),
    #[default]
    Unknown,
}

impl NodeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlanType => "plan_type",
            Self::Industry => "industry",
            Self::Feature => "feature",
            Self::Other(raw) => raw,
            Self::Unknown => "",
        }
    }

    /// Vertical band index used by the layout: plan types on top, features at the bottom.
    pub fn band(&self) -> u8 {
        match self {
            Self::PlanType => 0,
            Self::Industry => 1,
            Self::Feature => 2,
            Self::Other(_) | Self::Unknown => 1,
        }
    }

    /// Community label assigned to fixture nodes, which carry no precomputed clusters.
    pub fn fixture_community(&self) -> u32 {
        match self {
            Self::PlanType => 0,
            Self::Industry => 1,
            Self::Feature => 2,
            Self::Other(_) | Self::Unknown => 0,
        }
    }
}

impl From<&str> for NodeType {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "plan_type" => Self::PlanType,
            "industry" => Self::Industry,
            "feature" => Self::Feature,
            "" => Self::Unknown,
            _ => Self::Other(trimmed.to_owned()),
        }
    }
}

impl From<String> for NodeType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<NodeType> for String {
    fn from(value: NodeType) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("other"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    pub size: f32,
    #[serde(default = "default_degree")]
    pub degree: u32,
    #[serde(default)]
    pub community: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

fn default_degree() -> u32 {
    1
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        node_type: impl Into<NodeType>,
        size: f32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: node_type.into(),
            size: size.max(0.0),
            degree: default_degree(),
            community: 0,
            match_score: None,
            position: None,
        }
    }

    pub fn with_community(mut self, community: u32) -> Self {
        self.community = community;
        self
    }

    pub fn with_degree(mut self, degree: u32) -> Self {
        self.degree = degree;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: label.into(),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.max(0.0);
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub community_count: usize,
}

impl GraphMetadata {
    pub fn describe(nodes: &[Node], edges: &[Edge]) -> Self {
        let community_count = nodes
            .iter()
            .map(|node| node.community)
            .collect::<BTreeSet<_>>()
            .len();
        Self {
            total_nodes: nodes.len(),
            total_edges: edges.len(),
            community_count,
        }
    }
}

/// The unit handed to the renderer. Every pipeline stage builds a new one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub metadata: GraphMetadata,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let metadata = GraphMetadata::describe(&nodes, &edges);
        Self {
            nodes,
            edges,
            metadata,
        }
    }

    pub fn with_metadata(mut self, metadata: GraphMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn positions(&self) -> HashMap<NodeId, Position> {
        self.nodes
            .iter()
            .filter_map(|node| node.position.map(|position| (node.id.clone(), position)))
            .collect()
    }

    pub fn restrict_to_community(&self, community: Option<u32>) -> Self {
        let (nodes, edges) = filter_community(&self.nodes, &self.edges, community);
        Self::new(nodes, edges)
    }
}

/// Edges of `edges` whose endpoints are both present in `nodes`, in input order.
pub fn induced_edges(nodes: &[Node], edges: &[Edge]) -> Vec<Edge> {
    let present = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();
    edges
        .iter()
        .filter(|edge| {
            present.contains(edge.source.as_str()) && present.contains(edge.target.as_str())
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_parses_case_insensitively_and_keeps_unknown_text() {
        assert_eq!(NodeType::from("Plan_Type"), NodeType::PlanType);
        assert_eq!(NodeType::from("industry"), NodeType::Industry);
        assert_eq!(NodeType::from(" feature "), NodeType::Feature);
        assert_eq!(
            NodeType::from("Regulation"),
            NodeType::Other("Regulation".to_owned())
        );
        assert_eq!(NodeType::from(""), NodeType::Unknown);
        assert_eq!(NodeType::Other("x".to_owned()).band(), 1);
        assert_eq!(NodeType::Unknown.to_string(), "other");
    }

    #[test]
    fn induced_edges_drop_dangling_endpoints() {
        let nodes = vec![
            Node::new("1", "A", "plan_type", 10.0),
            Node::new("2", "B", "industry", 10.0),
        ];
        let edges = vec![
            Edge::new("e0", "1", "2", "includes"),
            Edge::new("e1", "1", "3", "offers"),
            Edge::new("e2", "4", "2", "found in"),
        ];

        let kept = induced_edges(&nodes, &edges);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "e0");
    }

    #[test]
    fn metadata_counts_distinct_communities() {
        let nodes = vec![
            Node::new("1", "A", "plan_type", 1.0).with_community(0),
            Node::new("2", "B", "industry", 1.0).with_community(3),
            Node::new("3", "C", "feature", 1.0).with_community(3),
        ];
        let metadata = GraphMetadata::describe(&nodes, &[]);
        assert_eq!(metadata.total_nodes, 3);
        assert_eq!(metadata.total_edges, 0);
        assert_eq!(metadata.community_count, 2);
    }

    #[test]
    fn node_serializes_type_as_wire_string() {
        let node = Node::new("7", "Vesting", "feature", 10.0);
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "feature");
        assert!(value.get("match_score").is_none());
    }
}
