use thiserror::Error;

/// Failures surfaced by graph sources and configuration.
///
/// Every variant except [`GraphError::InvalidConfig`] is a fetch failure: the
/// controller keeps the last good snapshot and lets the user retry.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("backend reported an error: {0}")]
    Backend(String),

    #[error("could not decode graph payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl GraphError {
    pub fn is_fetch_failure(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;
