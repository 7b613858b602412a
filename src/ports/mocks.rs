//! Recording test doubles for the ports
//!
//! Used by integration tests, which cannot see the `mockall` mocks generated
//! under `cfg(test)`.

use std::sync::{Arc, Mutex};
use async_trait::async_trait;

use crate::domain::{InvocationContext, PoolSnapshot, SnapshotKey};
use super::{PoolProvider, ProviderError, SnapshotStore, StoreError, WriteReceipt};

#[derive(Debug, Clone)]
enum FetchResponse {
    Pools(PoolSnapshot),
    Absent,
    Fail(String),
}

/// Provider that returns a canned response and counts calls
#[derive(Debug, Clone)]
pub struct StaticPoolProvider {
    response: FetchResponse,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticPoolProvider {
    pub fn with_pools(snapshot: PoolSnapshot) -> Self {
        Self::from_response(FetchResponse::Pools(snapshot))
    }

    pub fn absent() -> Self {
        Self::from_response(FetchResponse::Absent)
    }

    pub fn failing(message: &str) -> Self {
        Self::from_response(FetchResponse::Fail(message.to_string()))
    }

    fn from_response(response: FetchResponse) -> Self {
        Self {
            response,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Request ids of every fetch made so far
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PoolProvider for StaticPoolProvider {
    async fn fetch_pools(
        &self,
        ctx: &InvocationContext,
    ) -> Result<Option<PoolSnapshot>, ProviderError> {
        self.calls.lock().unwrap().push(ctx.request_id().to_string());
        match &self.response {
            FetchResponse::Pools(snapshot) => Ok(Some(snapshot.clone())),
            FetchResponse::Absent => Ok(None),
            FetchResponse::Fail(message) => Err(ProviderError::HttpError(message.clone())),
        }
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Store spy that records every write
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    writes: Arc<Mutex<Vec<(SnapshotKey, Vec<u8>)>>>,
    failure: Option<String>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to make every write fail with a transport error
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// All attempted writes, including failed ones
    pub fn get_writes(&self) -> Vec<(SnapshotKey, Vec<u8>)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SnapshotStore for RecordingStore {
    async fn write(&self, key: &SnapshotKey, bytes: Vec<u8>) -> Result<WriteReceipt, StoreError> {
        let len = bytes.len();
        self.writes.lock().unwrap().push((key.clone(), bytes));
        match &self.failure {
            Some(message) => Err(StoreError::TransportError(message.clone())),
            None => Ok(WriteReceipt::new(key.clone(), len)),
        }
    }

    fn location(&self) -> String {
        "memory://recording".to_string()
    }
}
