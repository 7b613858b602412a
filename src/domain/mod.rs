//! Domain Layer - Core types for the pool snapshot cache
//!
//! This module contains pure domain types with no I/O.
//! All external interactions happen through the ports layer.

pub mod network;
pub mod protocol;
pub mod pool;
pub mod snapshot_key;
pub mod invocation;

pub use network::NetworkId;
pub use protocol::{ProtocolId, UnknownProtocol};
pub use pool::{Pool, PoolSnapshot, TokenRef, V2Pool, V3Pool};
pub use snapshot_key::SnapshotKey;
pub use invocation::{InvocationContext, generate_request_id};
