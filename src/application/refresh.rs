//! Refresh Pipeline
//!
//! One invocation: resolve provider -> fetch -> validate -> derive key ->
//! serialize -> write. Every step runs once, in order, and any failure ends
//! the invocation. Nothing here retries.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use crate::domain::{InvocationContext, NetworkId, PoolSnapshot, ProtocolId, SnapshotKey};
use crate::ports::{ProviderError, SnapshotStore, StoreError, WriteReceipt};
use super::registry::{ProviderRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("No pool provider registered for protocol {protocol} on network {network}")]
    BindingNotFound {
        network: NetworkId,
        protocol: ProtocolId,
    },
    #[error("Failed to get pools for {protocol} on {network}")]
    FetchFailed {
        network: NetworkId,
        protocol: ProtocolId,
        #[source]
        cause: ProviderError,
    },
    #[error("Failed to serialize snapshot for {key}")]
    SerializeFailed {
        key: SnapshotKey,
        #[source]
        cause: serde_json::Error,
    },
    #[error("Failed to write snapshot to {key}")]
    StoreFailed {
        key: SnapshotKey,
        #[source]
        cause: StoreError,
    },
}

impl RefreshError {
    /// Missing provider registration rather than a runtime fault
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, RefreshError::BindingNotFound { .. })
    }

    pub fn stage(&self) -> RefreshStage {
        match self {
            RefreshError::BindingNotFound { .. } => RefreshStage::Start,
            RefreshError::FetchFailed { .. } => RefreshStage::ProviderResolved,
            RefreshError::SerializeFailed { .. } | RefreshError::StoreFailed { .. } => {
                RefreshStage::KeyDerived
            }
        }
    }
}

impl From<RegistryError> for RefreshError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::BindingNotFound { network, protocol } => {
                RefreshError::BindingNotFound { network, protocol }
            }
        }
    }
}

/// Steps of one invocation, used to label log lines.
/// A failure error reports the last stage that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Start,
    ProviderResolved,
    Fetched,
    EmptyResult,
    KeyDerived,
    Written,
    Done,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshStage::Start => "start",
            RefreshStage::ProviderResolved => "provider_resolved",
            RefreshStage::Fetched => "fetched",
            RefreshStage::EmptyResult => "empty_result",
            RefreshStage::KeyDerived => "key_derived",
            RefreshStage::Written => "written",
            RefreshStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Successful end states of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Snapshot written to the store
    Cached {
        key: SnapshotKey,
        pool_count: usize,
        receipt: WriteReceipt,
    },
    /// Upstream had no pools; the previous snapshot is left in place
    NoPools {
        network: NetworkId,
        protocol: ProtocolId,
    },
}

impl RefreshOutcome {
    pub fn is_cached(&self) -> bool {
        matches!(self, RefreshOutcome::Cached { .. })
    }
}

pub struct RefreshPipeline {
    registry: Arc<ProviderRegistry>,
    store: Arc<dyn SnapshotStore>,
    key_prefix: String,
}

impl RefreshPipeline {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        store: Arc<dyn SnapshotStore>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            key_prefix: key_prefix.into(),
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn key_for(&self, network: NetworkId, protocol: ProtocolId) -> SnapshotKey {
        SnapshotKey::derive(&self.key_prefix, network, protocol)
    }

    /// Run one refresh for the pair, logging under the context's span
    pub async fn run(
        &self,
        ctx: &InvocationContext,
        network: NetworkId,
        protocol: ProtocolId,
    ) -> Result<RefreshOutcome, RefreshError> {
        let span = ctx.span().clone();
        let result = self.run_steps(ctx, network, protocol).instrument(span).await;

        if let Err(ref e) = result {
            tracing::error!(
                parent: ctx.span(),
                stage = %e.stage(),
                configuration = e.is_configuration_error(),
                error = %e,
                cause = ?std::error::Error::source(e).map(|c| c.to_string()),
                "Refresh failed"
            );
        }

        result
    }

    async fn run_steps(
        &self,
        ctx: &InvocationContext,
        network: NetworkId,
        protocol: ProtocolId,
    ) -> Result<RefreshOutcome, RefreshError> {
        tracing::info!(
            stage = %RefreshStage::Start,
            %network,
            %protocol,
            "Starting getting pools for {} on {}",
            protocol,
            network
        );

        let provider = self.registry.resolve(network, protocol)?;
        tracing::debug!(
            stage = %RefreshStage::ProviderResolved,
            provider = %provider.describe(),
            "Resolved pool provider"
        );

        let snapshot = provider
            .fetch_pools(ctx)
            .await
            .map_err(|cause| RefreshError::FetchFailed { network, protocol, cause })?;
        tracing::debug!(
            stage = %RefreshStage::Fetched,
            pool_count = ?snapshot.as_ref().map(PoolSnapshot::len),
            "Fetch complete"
        );

        let snapshot = match snapshot {
            Some(snapshot) if !snapshot.is_empty() => snapshot,
            _ => {
                tracing::info!(
                    stage = %RefreshStage::EmptyResult,
                    "No {} pools found from the subgraph for {}",
                    protocol,
                    network
                );
                return Ok(RefreshOutcome::NoPools { network, protocol });
            }
        };

        let key = self.key_for(network, protocol);
        tracing::info!(
            stage = %RefreshStage::KeyDerived,
            pool_count = snapshot.len(),
            key = %key,
            "Got {} {} pools from the subgraph for {}. Saving to {}",
            snapshot.len(),
            protocol,
            network,
            key
        );

        let receipt = self.write_snapshot(&key, &snapshot).await?;
        tracing::info!(
            stage = %RefreshStage::Written,
            bytes = receipt.bytes_written,
            etag = ?receipt.etag,
            version_id = ?receipt.version_id,
            "Done {} for {}",
            protocol,
            network
        );

        tracing::info!(
            stage = %RefreshStage::Done,
            location = %self.store.location(),
            "Successfully cached {} {} pools",
            network,
            protocol
        );

        Ok(RefreshOutcome::Cached {
            key,
            pool_count: snapshot.len(),
            receipt,
        })
    }

    async fn write_snapshot(
        &self,
        key: &SnapshotKey,
        snapshot: &PoolSnapshot,
    ) -> Result<WriteReceipt, RefreshError> {
        let bytes = snapshot.to_bytes().map_err(|cause| RefreshError::SerializeFailed {
            key: key.clone(),
            cause,
        })?;

        self.store
            .write(key, bytes)
            .await
            .map_err(|cause| RefreshError::StoreFailed { key: key.clone(), cause })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::ProviderBinding;
    use crate::domain::{Pool, TokenRef, V3Pool};
    use crate::ports::{MockPoolProvider, MockSnapshotStore};
    use tokio_test::{assert_err, assert_ok};

    fn pool(id: &str) -> Pool {
        V3Pool {
            id: id.to_string(),
            fee_tier: "500".to_string(),
            liquidity: "1000".to_string(),
            token0: TokenRef::new("0xt0"),
            token1: TokenRef::new("0xt1"),
            tvl_eth: 1.0,
            tvl_usd: 3_000.0,
        }
        .into()
    }

    fn pipeline(provider: MockPoolProvider, store: MockSnapshotStore) -> RefreshPipeline {
        let registry = ProviderRegistry::new(vec![ProviderBinding::new(
            NetworkId::MAINNET,
            ProtocolId::V3,
            Arc::new(provider),
        )]);
        RefreshPipeline::new(Arc::new(registry), Arc::new(store), "pools")
    }

    fn provider_returning(
        result: fn() -> Result<Option<PoolSnapshot>, ProviderError>,
    ) -> MockPoolProvider {
        let mut provider = MockPoolProvider::new();
        provider.expect_describe().return_const("mock".to_string());
        provider.expect_fetch_pools().times(1).returning(move |_| result());
        provider
    }

    fn store_never_written() -> MockSnapshotStore {
        let mut store = MockSnapshotStore::new();
        store.expect_write().never();
        store.expect_location().return_const("mock://".to_string());
        store
    }

    #[tokio::test]
    async fn test_writes_non_empty_snapshot_once() {
        let provider = provider_returning(|| {
            Ok(Some(PoolSnapshot::new(vec![pool("0x1"), pool("0x2")])))
        });
        let mut store = MockSnapshotStore::new();
        store.expect_location().return_const("mock://".to_string());
        store
            .expect_write()
            .times(1)
            .withf(|key, bytes| {
                key.as_str() == "pools-1-V3"
                    && PoolSnapshot::from_bytes(bytes).map(|s| s.len()).ok() == Some(2)
            })
            .returning(|key, bytes| Ok(WriteReceipt::new(key.clone(), bytes.len())));

        let outcome = assert_ok!(
            pipeline(provider, store)
                .run(&InvocationContext::new("t"), NetworkId::MAINNET, ProtocolId::V3)
                .await
        );

        match outcome {
            RefreshOutcome::Cached { key, pool_count, receipt } => {
                assert_eq!(key.as_str(), "pools-1-V3");
                assert_eq!(pool_count, 2);
                assert_eq!(receipt.key, key);
            }
            other => panic!("expected Cached, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_snapshot_skips_write() {
        let provider = provider_returning(|| Ok(Some(PoolSnapshot::default())));

        let outcome = pipeline(provider, store_never_written())
            .run(&InvocationContext::new("t"), NetworkId::MAINNET, ProtocolId::V3)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RefreshOutcome::NoPools {
                network: NetworkId::MAINNET,
                protocol: ProtocolId::V3,
            }
        );
    }

    #[tokio::test]
    async fn test_absent_snapshot_skips_write() {
        let provider = provider_returning(|| Ok(None));

        let outcome = pipeline(provider, store_never_written())
            .run(&InvocationContext::new("t"), NetworkId::MAINNET, ProtocolId::V3)
            .await
            .unwrap();

        assert!(!outcome.is_cached());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_retried_and_skips_write() {
        // times(1) on the provider fails the test if the pipeline retries
        let provider = provider_returning(|| Err(ProviderError::Timeout));

        let err = assert_err!(
            pipeline(provider, store_never_written())
                .run(&InvocationContext::new("t"), NetworkId::MAINNET, ProtocolId::V3)
                .await
        );

        assert!(matches!(
            err,
            RefreshError::FetchFailed { cause: ProviderError::Timeout, .. }
        ));
        assert!(!err.is_configuration_error());
        assert_eq!(err.stage(), RefreshStage::ProviderResolved);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let provider = provider_returning(|| Ok(Some(PoolSnapshot::new(vec![pool("0x1")]))));
        let mut store = MockSnapshotStore::new();
        store.expect_location().return_const("mock://".to_string());
        store
            .expect_write()
            .times(1)
            .returning(|_, _| Err(StoreError::PermissionDenied("AccessDenied".into())));

        let err = pipeline(provider, store)
            .run(&InvocationContext::new("t"), NetworkId::MAINNET, ProtocolId::V3)
            .await
            .unwrap_err();

        match err {
            RefreshError::StoreFailed { key, cause } => {
                assert_eq!(key.as_str(), "pools-1-V3");
                assert!(matches!(cause, StoreError::PermissionDenied(_)));
            }
            other => panic!("expected StoreFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_binding_never_fetches() {
        let mut provider = MockPoolProvider::new();
        provider.expect_fetch_pools().never();
        provider.expect_describe().return_const("mock".to_string());

        let err = pipeline(provider, store_never_written())
            .run(&InvocationContext::new("t"), NetworkId::new(99), ProtocolId::V3)
            .await
            .unwrap_err();

        assert!(err.is_configuration_error());
        assert!(matches!(
            err,
            RefreshError::BindingNotFound { network, protocol: ProtocolId::V3 } if network == NetworkId::new(99)
        ));
    }

    #[test]
    fn test_key_for_uses_prefix() {
        let pipeline = pipeline(MockPoolProvider::new(), MockSnapshotStore::new());
        assert_eq!(pipeline.key_for(NetworkId::BASE, ProtocolId::V2).as_str(), "pools-8453-V2");
    }
}
