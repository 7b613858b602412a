//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Subgraph: GraphQL pool providers for V2 and V3
//! - Storage: S3 and local filesystem snapshot stores
//! - CLI: Command-line interface handlers

pub mod subgraph;
pub mod storage;
pub mod cli;

pub use subgraph::{V2SubgraphProvider, V3SubgraphProvider, SubgraphClient};
pub use storage::{FsSnapshotStore, S3SnapshotStore};
pub use cli::CliApp;
