use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde_json::json;
use tracing::debug;

use crate::error::{GraphError, Result};

use super::wire::{decode_graph, decode_query};
use super::{GraphPayload, QueryPayload};

/// HTTP client for the search service's graph endpoints.
#[derive(Clone, Debug)]
pub struct RemoteGraph {
    client: Client,
    graph_url: String,
    query_url: String,
}

impl RemoteGraph {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let base = api_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(GraphError::InvalidConfig("API URL is empty".to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GraphError::InvalidConfig(error.to_string()))?;

        Ok(Self {
            client,
            graph_url: format!("{base}/graph/"),
            query_url: format!("{base}/graph/query"),
        })
    }

    pub fn graph_url(&self) -> &str {
        &self.graph_url
    }

    pub fn query_url(&self) -> &str {
        &self.query_url
    }

    pub fn fetch_all(&self) -> Result<GraphPayload> {
        debug!(url = %self.graph_url, "fetching full graph");
        let response = self
            .client
            .get(&self.graph_url)
            .send()
            .map_err(|source| transport(&self.graph_url, source))?;
        let body = read_body(&self.graph_url, response)?;
        decode_graph(&body)
    }

    pub fn query(&self, query: &str) -> Result<QueryPayload> {
        debug!(url = %self.query_url, query, "querying graph");
        let response = self
            .client
            .post(&self.query_url)
            .json(&json!({ "query": query }))
            .send()
            .map_err(|source| transport(&self.query_url, source))?;
        let body = read_body(&self.query_url, response)?;
        decode_query(&body)
    }
}

fn transport(url: &str, source: reqwest::Error) -> GraphError {
    GraphError::Transport {
        url: url.to_owned(),
        source,
    }
}

fn read_body(url: &str, response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(GraphError::Status {
            url: url.to_owned(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(|source| transport(url, source))
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Answers exactly one request on a loopback port with a canned response.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut chunk).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{address}")
    }

    fn loopback(base: &str) -> RemoteGraph {
        let mut remote = RemoteGraph::new(base, Duration::from_secs(5)).unwrap();
        // Keep ambient proxy settings away from loopback traffic.
        remote.client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        remote
    }

    #[test]
    fn non_success_status_is_a_fetch_failure() {
        let base = serve_once("HTTP/1.1 500 Internal Server Error", "");
        let error = loopback(&base).fetch_all().unwrap_err();

        assert!(matches!(&error, GraphError::Status { status: 500, url } if url.ends_with("/graph/")));
        assert!(error.is_fetch_failure());
    }

    #[test]
    fn refused_connection_is_a_transport_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let error = loopback(&format!("http://{address}")).fetch_all().unwrap_err();
        assert!(matches!(error, GraphError::Transport { .. }));
        assert!(error.is_fetch_failure());
    }

    #[test]
    fn successful_fetch_decodes_the_graph() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"nodes": [{"id": "1", "data": {"label": "Pension Plans", "type": "plan_type"}},
                          {"id": "2", "data": {"label": "Vesting", "type": "feature"}}],
                "edges": [{"source": "1", "target": "2", "data": {"relationship": "requires"}}]}"#,
        );
        let payload = loopback(&base).fetch_all().unwrap();

        assert_eq!(payload.nodes.len(), 2);
        assert_eq!(payload.nodes[0].label, "Pension Plans");
        assert_eq!(payload.edges[0].label, "requires");
    }

    #[test]
    fn endpoints_are_derived_from_base_url() {
        let remote = RemoteGraph::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(remote.graph_url(), "http://localhost:8000/graph/");
        assert_eq!(remote.query_url(), "http://localhost:8000/graph/query");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        let error = RemoteGraph::new("  ", Duration::from_secs(5)).unwrap_err();
        assert!(!error.is_fetch_failure());
    }
}
