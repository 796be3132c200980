//! Knowledge-graph engine behind the pension plan explorer.
//!
//! The crate ingests a node/edge graph from a [`source::GraphSource`], scores
//! nodes against free-text queries, derives community and search subgraphs,
//! and places nodes on a fixed canvas with a force-directed simulation. The
//! [`controller::QueryController`] ties the stages together for a UI loop.

pub mod config;
pub mod controller;
pub mod error;
pub mod graph;
pub mod layout;
pub mod search;
pub mod source;

pub use error::{GraphError, Result};
