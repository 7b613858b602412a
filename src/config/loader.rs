//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/pool-cache.toml, with environment variable overrides for the
//! values the scheduler sets per deployment.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::adapters::subgraph::{SubgraphConfig, SubgraphProviderSpec, DEFAULT_PAGE_SIZE};
use crate::domain::{NetworkId, ProtocolId};

/// Main configuration structure matching config/pool-cache.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub job: JobSection,
    pub cache: CacheSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub providers: Vec<ProviderSection>,
}

/// Which pair this process refreshes
#[derive(Debug, Clone, Deserialize)]
pub struct JobSection {
    pub network: NetworkId,
    pub protocol: ProtocolId,
}

impl JobSection {
    /// Network with NETWORK_ID env override
    pub fn get_network(&self) -> Result<NetworkId, ConfigError> {
        match std::env::var("NETWORK_ID") {
            Ok(value) => value.parse().map_err(|e| {
                ConfigError::ValidationError(format!("NETWORK_ID '{}' is not a chain id: {}", value, e))
            }),
            Err(_) => Ok(self.network),
        }
    }

    /// Protocol with PROTOCOL env override
    pub fn get_protocol(&self) -> Result<ProtocolId, ConfigError> {
        match std::env::var("PROTOCOL") {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::ValidationError(format!("PROTOCOL: {}", e))),
            Err(_) => Ok(self.protocol),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Filesystem,
}

/// Snapshot storage section
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Prefix of every snapshot key
    pub key_prefix: String,
    pub backend: StorageBackend,
    /// S3 bucket (backend = "s3")
    #[serde(default)]
    pub bucket: Option<String>,
    /// AWS region; falls back to the default AWS region chain
    #[serde(default)]
    pub region: Option<String>,
    /// Directory for backend = "filesystem"; `~` is expanded
    #[serde(default)]
    pub root_dir: Option<String>,
}

impl CacheSection {
    /// Key prefix with POOL_CACHE_KEY env override
    pub fn get_key_prefix(&self) -> String {
        std::env::var("POOL_CACHE_KEY").unwrap_or_else(|_| self.key_prefix.clone())
    }

    /// Bucket with POOL_CACHE_BUCKET env override
    pub fn get_bucket(&self) -> Option<String> {
        std::env::var("POOL_CACHE_BUCKET").ok().or_else(|| self.bucket.clone())
    }

    pub fn get_root_dir(&self) -> Option<PathBuf> {
        self.root_dir
            .as_ref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).to_string()))
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// One provider binding
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSection {
    pub network: NetworkId,
    pub protocol: ProtocolId,
    pub subgraph_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pools with less tracked ETH liquidity than this are dropped
    #[serde(default = "default_tracked_eth_threshold")]
    pub tracked_eth_threshold: f64,
    /// V2 only: untracked pairs need at least this much USD reserve
    #[serde(default = "default_untracked_usd_threshold")]
    pub untracked_usd_threshold: f64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    90
}

fn default_tracked_eth_threshold() -> f64 {
    0.01
}

fn default_untracked_usd_threshold() -> f64 {
    25_000.0
}

impl ProviderSection {
    pub fn to_spec(&self) -> SubgraphProviderSpec {
        SubgraphProviderSpec {
            protocol: self.protocol,
            subgraph: SubgraphConfig {
                url: self.subgraph_url.clone(),
                page_size: self.page_size,
                timeout: Duration::from_secs(self.timeout_secs),
            },
            tracked_eth_threshold: self.tracked_eth_threshold,
            untracked_usd_threshold: self.untracked_usd_threshold,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.get_key_prefix().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "key_prefix cannot be empty".to_string(),
            ));
        }

        match self.cache.backend {
            StorageBackend::S3 => {
                if self.cache.get_bucket().map_or(true, |b| b.trim().is_empty()) {
                    return Err(ConfigError::ValidationError(
                        "bucket is required for the s3 backend".to_string(),
                    ));
                }
            }
            StorageBackend::Filesystem => {
                if self.cache.root_dir.as_deref().map_or(true, |d| d.trim().is_empty()) {
                    return Err(ConfigError::ValidationError(
                        "root_dir is required for the filesystem backend".to_string(),
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert((provider.network, provider.protocol)) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate provider for {} on network {}",
                    provider.protocol, provider.network
                )));
            }

            if reqwest::Url::parse(&provider.subgraph_url).is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "subgraph_url '{}' for {} on network {} is not a valid URL",
                    provider.subgraph_url, provider.protocol, provider.network
                )));
            }

            if provider.page_size == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "page_size must be > 0 for {} on network {}",
                    provider.protocol, provider.network
                )));
            }

            if provider.timeout_secs == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "timeout_secs must be > 0 for {} on network {}",
                    provider.protocol, provider.network
                )));
            }

            if provider.tracked_eth_threshold < 0.0 || provider.untracked_usd_threshold < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "thresholds must be >= 0 for {} on network {}",
                    provider.protocol, provider.network
                )));
            }
        }

        Ok(())
    }
}
