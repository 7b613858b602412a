//! Pool Snapshot Cache Library
//!
//! Scheduled job that fetches the liquidity pools for one (network, protocol)
//! pair and overwrites the cached snapshot the routing service reads.
//!
//! # Modules
//!
//! - `domain`: Core types (NetworkId, ProtocolId, Pool, SnapshotKey)
//! - `ports`: Trait abstractions (PoolProvider, SnapshotStore)
//! - `adapters`: External implementations (Subgraph, S3, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Provider registry and refresh pipeline

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
