use serde::Deserialize;
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::graph::{Edge, GraphMetadata, Node, NodeType, Position};
use crate::search::SearchResult;

use super::{GraphPayload, QueryPayload};

const DEFAULT_RELEVANCE: f32 = 0.5;
const SIZE_PER_DEGREE: f32 = 5.0;

/// Ids arrive as strings from the service but numbers are tolerated.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawNodeData {
    #[serde(default)]
    label: Option<String>,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    size: Option<f32>,
    #[serde(default)]
    degree: Option<f64>,
    #[serde(default)]
    community: Option<i64>,
    #[serde(default)]
    relevance: Option<f32>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    id: RawId,
    #[serde(default)]
    label: Option<String>,
    #[serde(default, rename = "type")]
    node_type: Option<String>,
    #[serde(default)]
    size: Option<f32>,
    #[serde(default)]
    data: RawNodeData,
    #[serde(default)]
    position: Option<Position>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawEdgeData {
    #[serde(default)]
    relationship: Option<String>,
    #[serde(default)]
    weight: Option<f32>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    id: Option<RawId>,
    source: RawId,
    target: RawId,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    weight: Option<f32>,
    #[serde(default)]
    data: RawEdgeData,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    communities: Option<usize>,
    #[serde(default)]
    total_nodes: Option<usize>,
    #[serde(default)]
    total_edges: Option<usize>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawGraph {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawQuery {
    #[serde(default)]
    subgraph: RawGraph,
    #[serde(default)]
    sources: Vec<SearchResult>,
    #[serde(default)]
    answer: Option<String>,
}

fn convert_node(raw: RawNode, scored: bool) -> Node {
    let id = raw.id.into_string();
    let data = raw.data;

    let degree = data
        .degree
        .filter(|degree| degree.is_finite() && *degree > 0.0)
        .map(|degree| degree.round().max(1.0) as u32)
        .unwrap_or(1);
    let label = raw
        .label
        .filter(|label| !label.is_empty())
        .or(data.label.filter(|label| !label.is_empty()))
        .unwrap_or_else(|| id.clone());
    let node_type = raw
        .node_type
        .or(data.node_type)
        .map(NodeType::from)
        .unwrap_or_default();
    let size = raw
        .size
        .or(data.size)
        .filter(|size| size.is_finite())
        .unwrap_or(degree as f32 * SIZE_PER_DEGREE);
    let community = data.community.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32;

    let mut node = Node::new(id, label, node_type, size)
        .with_degree(degree)
        .with_community(community);
    node.position = raw
        .position
        .filter(|position| position.x.is_finite() && position.y.is_finite());
    if scored {
        // A zero or missing relevance means "unscored" to the service.
        let relevance = data
            .relevance
            .filter(|relevance| relevance.is_finite() && *relevance > 0.0)
            .unwrap_or(DEFAULT_RELEVANCE);
        node.match_score = Some(relevance.min(1.0));
    }
    node
}

fn convert_edge(raw: RawEdge) -> Edge {
    let source = raw.source.into_string();
    let target = raw.target.into_string();
    let id = raw
        .id
        .map(RawId::into_string)
        .unwrap_or_else(|| format!("e{source}-{target}"));
    let label = raw
        .label
        .or(raw.data.relationship)
        .unwrap_or_else(|| "related_to".to_owned());
    let weight = raw
        .weight
        .or(raw.data.weight)
        .filter(|weight| weight.is_finite())
        .unwrap_or(1.0);

    Edge::new(id, source, target, label).with_weight(weight)
}

fn convert_graph(raw: RawGraph, scored: bool) -> GraphPayload {
    let nodes = raw
        .nodes
        .into_iter()
        .map(|node| convert_node(node, scored))
        .collect::<Vec<_>>();
    let edges = raw.edges.into_iter().map(convert_edge).collect::<Vec<_>>();

    let metadata = raw.metadata.map(|reported| {
        let described = GraphMetadata::describe(&nodes, &edges);
        GraphMetadata {
            total_nodes: reported.total_nodes.unwrap_or(described.total_nodes),
            total_edges: reported.total_edges.unwrap_or(described.total_edges),
            community_count: reported.communities.unwrap_or(described.community_count),
        }
    });

    GraphPayload {
        nodes,
        edges,
        metadata,
    }
}

/// The service answers some failures with a 200 and an `{"error": ...}` body.
fn reject_error_body(value: &Value) -> Result<()> {
    match value.get("error") {
        Some(Value::String(message)) => Err(GraphError::Backend(message.clone())),
        Some(Value::Null) | None => Ok(()),
        Some(other) => Err(GraphError::Backend(other.to_string())),
    }
}

pub(super) fn decode_graph(body: &str) -> Result<GraphPayload> {
    let value: Value = serde_json::from_str(body)?;
    reject_error_body(&value)?;
    let raw = RawGraph::deserialize(value)?;
    Ok(convert_graph(raw, false))
}

pub(super) fn decode_query(body: &str) -> Result<QueryPayload> {
    let value: Value = serde_json::from_str(body)?;
    reject_error_body(&value)?;
    let raw = RawQuery::deserialize(value)?;
    Ok(QueryPayload {
        subgraph: convert_graph(raw.subgraph, true),
        sources: raw.sources,
        answer: raw.answer.filter(|answer| !answer.trim().is_empty()),
    })
}
