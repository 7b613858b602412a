use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{InvocationContext, PoolSnapshot};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    HttpError(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Subgraph returned status {status}: {body}")]
    StatusError { status: u16, body: String },
    #[error("Subgraph query failed: {0}")]
    GraphQlError(String),
    #[error("Failed to decode subgraph response: {0}")]
    DecodeError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::NetworkError(err.to_string())
        } else if err.is_decode() {
            ProviderError::DecodeError(err.to_string())
        } else {
            ProviderError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::DecodeError(err.to_string())
    }
}

/// Source of the current pool set for one (network, protocol) pair.
///
/// `fetch_pools` is called exactly once per refresh and its failure ends the
/// invocation. Implementations must not retry internally: some subgraphs
/// only fail after minutes, and a retry loop can push the job past the
/// scheduler's hard timeout while the store write is in flight.
///
/// `Ok(None)` means the upstream answered without any data, which the
/// pipeline treats the same as an empty snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolProvider: Send + Sync {
    async fn fetch_pools(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Option<PoolSnapshot>, ProviderError>;

    /// Short label for logs, e.g. the subgraph host
    fn describe(&self) -> String;
}
