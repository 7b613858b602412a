//! Provider Registry
//!
//! Fixed table of (network, protocol) -> provider bindings, built once at
//! startup and only read afterwards.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{NetworkId, ProtocolId};
use crate::ports::PoolProvider;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("No pool provider registered for protocol {protocol} on network {network}")]
    BindingNotFound {
        network: NetworkId,
        protocol: ProtocolId,
    },
}

/// One registered provider
#[derive(Clone)]
pub struct ProviderBinding {
    pub network: NetworkId,
    pub protocol: ProtocolId,
    pub provider: Arc<dyn PoolProvider>,
}

impl ProviderBinding {
    pub fn new(network: NetworkId, protocol: ProtocolId, provider: Arc<dyn PoolProvider>) -> Self {
        Self { network, protocol, provider }
    }

    fn matches(&self, network: NetworkId, protocol: ProtocolId) -> bool {
        self.network == network && self.protocol == protocol
    }
}

impl fmt::Debug for ProviderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderBinding")
            .field("network", &self.network)
            .field("protocol", &self.protocol)
            .field("provider", &self.provider.describe())
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    bindings: Vec<ProviderBinding>,
}

impl ProviderRegistry {
    pub fn new(bindings: Vec<ProviderBinding>) -> Self {
        Self { bindings }
    }

    /// Find the provider bound to exactly this pair. First match wins.
    pub fn resolve(
        &self,
        network: NetworkId,
        protocol: ProtocolId,
    ) -> Result<Arc<dyn PoolProvider>, RegistryError> {
        self.bindings
            .iter()
            .find(|binding| binding.matches(network, protocol))
            .map(|binding| Arc::clone(&binding.provider))
            .ok_or(RegistryError::BindingNotFound { network, protocol })
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ProviderBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::StaticPoolProvider;

    fn provider() -> Arc<dyn PoolProvider> {
        Arc::new(StaticPoolProvider::absent())
    }

    #[test]
    fn test_resolve_returns_bound_provider() {
        let v3_mainnet = provider();
        let v2_mainnet = provider();
        let v3_polygon = provider();
        let registry = ProviderRegistry::new(vec![
            ProviderBinding::new(NetworkId::MAINNET, ProtocolId::V3, v3_mainnet.clone()),
            ProviderBinding::new(NetworkId::MAINNET, ProtocolId::V2, v2_mainnet.clone()),
            ProviderBinding::new(NetworkId::POLYGON, ProtocolId::V3, v3_polygon.clone()),
        ]);

        let resolved = registry.resolve(NetworkId::MAINNET, ProtocolId::V3).unwrap();
        assert!(Arc::ptr_eq(&resolved, &v3_mainnet));
        let resolved = registry.resolve(NetworkId::MAINNET, ProtocolId::V2).unwrap();
        assert!(Arc::ptr_eq(&resolved, &v2_mainnet));
        let resolved = registry.resolve(NetworkId::POLYGON, ProtocolId::V3).unwrap();
        assert!(Arc::ptr_eq(&resolved, &v3_polygon));
    }

    #[test]
    fn test_resolve_requires_both_fields() {
        let registry = ProviderRegistry::new(vec![
            ProviderBinding::new(NetworkId::MAINNET, ProtocolId::V3, provider()),
        ]);

        let err = registry
            .resolve(NetworkId::MAINNET, ProtocolId::V2)
            .err()
            .expect("unbound pair");
        assert_eq!(
            err,
            RegistryError::BindingNotFound {
                network: NetworkId::MAINNET,
                protocol: ProtocolId::V2,
            }
        );
        assert!(registry.resolve(NetworkId::new(99), ProtocolId::V3).is_err());
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let first = provider();
        let second = provider();
        let registry = ProviderRegistry::new(vec![
            ProviderBinding::new(NetworkId::BASE, ProtocolId::V3, first.clone()),
            ProviderBinding::new(NetworkId::BASE, ProtocolId::V3, second),
        ]);

        let resolved = registry.resolve(NetworkId::BASE, ProtocolId::V3).unwrap();
        assert!(Arc::ptr_eq(&resolved, &first));
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.resolve(NetworkId::MAINNET, ProtocolId::V3).is_err());
    }

    #[test]
    fn test_error_message_names_pair() {
        let err = RegistryError::BindingNotFound {
            network: NetworkId::new(99),
            protocol: ProtocolId::V3,
        };
        assert!(err.to_string().contains("99"));
        assert!(err.to_string().contains("V3"));
    }
}
