//! Snapshot key derivation
//!
//! The key is the contract between this job and the routing service that
//! reads the cache, so its layout must never change between releases:
//! `{prefix}-{network}-{protocol}`.

use serde::Serialize;
use std::fmt;

use super::{NetworkId, ProtocolId};

/// Storage key of a pool snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    /// Derive the key for a (network, protocol) pair. Pure and deterministic.
    pub fn derive(prefix: &str, network: NetworkId, protocol: ProtocolId) -> Self {
        Self(format!("{}-{}-{}", prefix, network, protocol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SnapshotKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
