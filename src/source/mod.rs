//! Where graph data comes from: the built-in fixture or the live search service.

mod remote;
mod wire;

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::graph::{Edge, GraphMetadata, Node, pension_fixture};
use crate::search::{SearchResult, select};

pub use remote::RemoteGraph;

/// A full graph as delivered by a source, before validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphPayload {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Counts reported by the source, if any.
    pub metadata: Option<GraphMetadata>,
}

/// A query answer: the relevant subgraph plus the results panel entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryPayload {
    pub subgraph: GraphPayload,
    pub sources: Vec<SearchResult>,
    /// Natural-language answer, only produced by the live service.
    pub answer: Option<String>,
}

/// In-memory graph answering queries with the local relevance scorer.
#[derive(Clone, Debug)]
pub struct StaticGraph {
    nodes: Arc<[Node]>,
    edges: Arc<[Edge]>,
}

impl StaticGraph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: nodes.into(),
            edges: edges.into(),
        }
    }

    pub fn fetch_all(&self) -> GraphPayload {
        GraphPayload {
            nodes: self.nodes.to_vec(),
            edges: self.edges.to_vec(),
            metadata: None,
        }
    }

    pub fn query(&self, query: &str) -> QueryPayload {
        let selection = select(&self.nodes, &self.edges, query);
        let metadata = selection.metadata();
        QueryPayload {
            subgraph: GraphPayload {
                nodes: selection.nodes,
                edges: selection.edges,
                metadata: Some(metadata),
            },
            sources: selection.results,
            answer: None,
        }
    }
}

/// Both data sources behind one `fetch_all` / `query` contract.
#[derive(Clone, Debug)]
pub enum GraphSource {
    Static(StaticGraph),
    Remote(RemoteGraph),
}

impl GraphSource {
    pub fn fixture() -> Self {
        let (nodes, edges) = pension_fixture();
        Self::Static(StaticGraph::new(nodes, edges))
    }

    pub fn remote(api_url: &str, timeout: Duration) -> Result<Self> {
        RemoteGraph::new(api_url, timeout).map(Self::Remote)
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Static(_) => "mock data",
            Self::Remote(_) => "live backend",
        }
    }

    pub fn fetch_all(&self) -> Result<GraphPayload> {
        match self {
            Self::Static(graph) => Ok(graph.fetch_all()),
            Self::Remote(remote) => remote.fetch_all(),
        }
    }

    pub fn query(&self, query: &str) -> Result<QueryPayload> {
        match self {
            Self::Static(graph) => Ok(graph.query(query)),
            Self::Remote(remote) => remote.query(query),
        }
    }
}
