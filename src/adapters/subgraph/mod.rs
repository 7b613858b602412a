//! Subgraph Adapter
//!
//! Implementations of the PoolProvider port backed by GraphQL subgraphs.

mod client;
mod v2;
mod v3;

pub use client::{SubgraphClient, SubgraphConfig, SubgraphEntity, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use v2::{V2SubgraphProvider, V2Thresholds};
pub use v3::V3SubgraphProvider;

use std::sync::Arc;

use crate::domain::ProtocolId;
use crate::ports::{PoolProvider, ProviderError};

/// Everything needed to build the provider for one binding
#[derive(Debug, Clone)]
pub struct SubgraphProviderSpec {
    pub protocol: ProtocolId,
    pub subgraph: SubgraphConfig,
    pub tracked_eth_threshold: f64,
    pub untracked_usd_threshold: f64,
}

/// Build the subgraph provider for the configured protocol
pub fn build_provider(spec: &SubgraphProviderSpec) -> Result<Arc<dyn PoolProvider>, ProviderError> {
    let client = SubgraphClient::new(spec.subgraph.clone())?;

    let provider: Arc<dyn PoolProvider> = match spec.protocol {
        ProtocolId::V3 => Arc::new(V3SubgraphProvider::new(client, spec.tracked_eth_threshold)),
        ProtocolId::V2 => Arc::new(V2SubgraphProvider::new(
            client,
            V2Thresholds {
                tracked_eth: spec.tracked_eth_threshold,
                untracked_usd: spec.untracked_usd_threshold,
            },
        )),
    };

    Ok(provider)
}
