use std::collections::HashSet;

use tracing::debug;

use super::{Edge, GraphMetadata, GraphSnapshot, Node, induced_edges};

/// Canonical, unfiltered and unscored node/edge collection.
///
/// Only ingestion writes here; every derived view is built from a copy.
#[derive(Clone, Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    metadata: GraphMetadata,
    revision: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>, metadata: Option<GraphMetadata>) -> Self {
        let mut store = Self::new();
        store.ingest(nodes, edges, metadata);
        store
    }

    /// Replaces the whole collection. Duplicate node ids keep their first
    /// occurrence, match scores are cleared and edges with a missing endpoint
    /// are dropped.
    pub fn ingest(&mut self, nodes: Vec<Node>, edges: Vec<Edge>, metadata: Option<GraphMetadata>) {
        let offered_nodes = nodes.len();
        let offered_edges = edges.len();

        let mut seen = HashSet::with_capacity(nodes.len());
        let nodes = nodes
            .into_iter()
            .filter(|node| seen.insert(node.id.clone()))
            .map(|mut node| {
                node.match_score = None;
                node
            })
            .collect::<Vec<_>>();
        let edges = induced_edges(&nodes, &edges);

        if nodes.len() != offered_nodes || edges.len() != offered_edges {
            debug!(
                dropped_nodes = offered_nodes - nodes.len(),
                dropped_edges = offered_edges - edges.len(),
                "discarded duplicate nodes and dangling edges during ingestion"
            );
        }

        let described = GraphMetadata::describe(&nodes, &edges);
        self.metadata = match metadata {
            Some(reported) => GraphMetadata {
                total_nodes: described.total_nodes,
                total_edges: described.total_edges,
                community_count: reported.community_count.max(described.community_count),
            },
            None => described,
        };
        self.nodes = nodes;
        self.edges = edges;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.ingest(Vec::new(), Vec::new(), None);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn metadata(&self) -> GraphMetadata {
        self.metadata
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone()).with_metadata(self.metadata)
    }
}
