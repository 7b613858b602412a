use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::SnapshotKey;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blob storage transport error: {0}")]
    TransportError(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid snapshot key '{0}'")]
    InvalidKey(String),
}

/// What the store reported back after a successful write
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReceipt {
    pub key: SnapshotKey,
    pub bytes_written: usize,
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub written_at: DateTime<Utc>,
}

impl WriteReceipt {
    pub fn new(key: SnapshotKey, bytes_written: usize) -> Self {
        Self {
            key,
            bytes_written,
            etag: None,
            version_id: None,
            written_at: Utc::now(),
        }
    }
}

/// Keyed blob storage for serialized snapshots.
///
/// `write` replaces whatever is stored under `key`, unconditionally. The
/// backend is expected to swap objects atomically; adapters do not attempt
/// to recover from a partially completed write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn write(&self, key: &SnapshotKey, bytes: Vec<u8>) -> Result<WriteReceipt, StoreError>;

    /// Human readable location, e.g. `s3://bucket`
    fn location(&self) -> String;
}
