//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Upstream pool data (subgraphs)
//! - Snapshot blob storage

pub mod pool_provider;
pub mod snapshot_store;
pub mod mocks;

pub use pool_provider::{PoolProvider, ProviderError};
pub use snapshot_store::{SnapshotStore, StoreError, WriteReceipt};

#[cfg(test)]
pub use pool_provider::MockPoolProvider;
#[cfg(test)]
pub use snapshot_store::MockSnapshotStore;
