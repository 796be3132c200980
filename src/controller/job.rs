use std::collections::HashMap;

use crate::error::Result;
use crate::graph::{GraphSnapshot, GraphStore, NodeId, Position, induced_edges};
use crate::layout::{LayoutConfig, layout_snapshot};
use crate::search::SearchResult;
use crate::source::GraphSource;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Request {
    FullGraph,
    Query(String),
    // A new source needs its canonical graph before the active query can be answered.
    IngestThenQuery(String),
}

/// One run of the fetch → select → layout pipeline, detached from the controller.
pub(super) struct Job {
    pub(super) generation: u64,
    pub(super) request: Request,
    pub(super) source: GraphSource,
    pub(super) prior: HashMap<NodeId, Position>,
    pub(super) layout: LayoutConfig,
}

#[derive(Debug, Default)]
pub(super) struct Outcome {
    /// Present when the job re-ingested the source.
    pub(super) store: Option<GraphStore>,
    pub(super) snapshot: GraphSnapshot,
    pub(super) results: Vec<SearchResult>,
    pub(super) answer: Option<String>,
    pub(super) source_label: &'static str,
}

#[derive(Debug)]
pub(super) struct Completion {
    pub(super) generation: u64,
    pub(super) outcome: Result<Outcome>,
}

impl Job {
    pub(super) fn run(self) -> Completion {
        let generation = self.generation;
        let outcome = self.execute();
        Completion {
            generation,
            outcome,
        }
    }

    fn execute(self) -> Result<Outcome> {
        let outcome = match &self.request {
            Request::FullGraph => {
                let store = self.ingest()?;
                Outcome {
                    snapshot: self.place(store.snapshot()),
                    store: Some(store),
                    ..Outcome::default()
                }
            }
            Request::Query(query) => self.answer(query)?,
            Request::IngestThenQuery(query) => {
                let store = self.ingest()?;
                Outcome {
                    store: Some(store),
                    ..self.answer(query)?
                }
            }
        };
        Ok(Outcome {
            source_label: self.source.label(),
            ..outcome
        })
    }

    fn ingest(&self) -> Result<GraphStore> {
        let payload = self.source.fetch_all()?;
        Ok(GraphStore::from_parts(payload.nodes, payload.edges, payload.metadata))
    }

    fn answer(&self, query: &str) -> Result<Outcome> {
        let payload = self.source.query(query)?;
        let subgraph = payload.subgraph;
        let edges = induced_edges(&subgraph.nodes, &subgraph.edges);
        let mut snapshot = GraphSnapshot::new(subgraph.nodes, edges);
        if let Some(reported) = subgraph.metadata {
            snapshot.metadata.community_count = reported.community_count;
        }
        Ok(Outcome {
            snapshot: self.place(snapshot),
            results: payload.sources,
            answer: payload.answer,
            ..Outcome::default()
        })
    }

    fn place(&self, mut snapshot: GraphSnapshot) -> GraphSnapshot {
        for node in &mut snapshot.nodes {
            if node.position.is_none() {
                node.position = self.prior.get(&node.id).copied();
            }
        }
        layout_snapshot(&snapshot, &self.layout)
    }
}
