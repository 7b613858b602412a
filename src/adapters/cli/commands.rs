//! CLI Command Handlers
//!
//! Argument definitions and the handlers that wire configuration, providers
//! and storage into a refresh pipeline.

use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::storage::{FsSnapshotStore, S3SnapshotStore};
use crate::adapters::subgraph::build_provider;
use crate::application::{ProviderBinding, ProviderRegistry, RefreshOutcome, RefreshPipeline};
use crate::config::{Config, StorageBackend};
use crate::domain::{InvocationContext, NetworkId, ProtocolId, SnapshotKey};
use crate::ports::SnapshotStore;

/// Pool snapshot cache - refreshes the routing service's cached pool sets
#[derive(Parser, Debug)]
#[command(
    name = "pool-cache",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Snapshot subgraph liquidity pools into blob storage",
    long_about = "Fetches the current pool set for one network and protocol from its subgraph \
                  and overwrites the cached snapshot the routing service reads at startup."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/pool-cache.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch pools and write the snapshot (scheduled entry point)
    Refresh(RefreshCmd),

    /// List registered (network, protocol) providers
    Bindings(BindingsCmd),

    /// Print the snapshot key for a pair
    Key(KeyCmd),
}

/// Run one refresh
#[derive(Parser, Debug)]
pub struct RefreshCmd {
    /// Override the configured network (chain id)
    #[arg(long, value_name = "CHAIN_ID")]
    pub network: Option<NetworkId>,

    /// Override the configured protocol (V2 or V3)
    #[arg(long, value_name = "PROTOCOL")]
    pub protocol: Option<ProtocolId>,

    /// Trigger event id used to correlate log lines
    #[arg(long, value_name = "ID", env = "REQUEST_ID")]
    pub request_id: Option<String>,
}

/// List bindings
#[derive(Parser, Debug)]
pub struct BindingsCmd {
    /// Output format (text, json)
    #[arg(short, long, value_name = "FORMAT", default_value = "text")]
    pub format: String,
}

/// Print a snapshot key
#[derive(Parser, Debug)]
pub struct KeyCmd {
    /// Chain id
    #[arg(value_name = "CHAIN_ID")]
    pub network: NetworkId,

    /// Protocol (V2 or V3)
    #[arg(value_name = "PROTOCOL")]
    pub protocol: ProtocolId,
}

/// Execute the parsed command against a loaded configuration
pub async fn execute(app: CliApp, config: Config) -> Result<()> {
    match app.command {
        Command::Refresh(cmd) => refresh_command(cmd, &config).await,
        Command::Bindings(cmd) => bindings_command(cmd, &config),
        Command::Key(cmd) => key_command(cmd, &config),
    }
}

/// Build the immutable provider table from configuration
pub fn build_registry(config: &Config) -> Result<ProviderRegistry> {
    let bindings = config
        .providers
        .iter()
        .map(|section| {
            let provider = build_provider(&section.to_spec()).with_context(|| {
                format!(
                    "Failed to build provider for {} on network {}",
                    section.protocol, section.network
                )
            })?;
            Ok(ProviderBinding::new(section.network, section.protocol, provider))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProviderRegistry::new(bindings))
}

async fn build_store(config: &Config) -> Result<Arc<dyn SnapshotStore>> {
    let store: Arc<dyn SnapshotStore> = match config.cache.backend {
        StorageBackend::S3 => {
            let bucket = config
                .cache
                .get_bucket()
                .context("No bucket configured for the s3 backend")?;
            Arc::new(S3SnapshotStore::from_env(bucket, config.cache.region.clone()).await)
        }
        StorageBackend::Filesystem => {
            let root = config
                .cache
                .get_root_dir()
                .context("No root_dir configured for the filesystem backend")?;
            Arc::new(FsSnapshotStore::new(root))
        }
    };
    Ok(store)
}

async fn refresh_command(cmd: RefreshCmd, config: &Config) -> Result<()> {
    let network = match cmd.network {
        Some(network) => network,
        None => config.job.get_network()?,
    };
    let protocol = match cmd.protocol {
        Some(protocol) => protocol,
        None => config.job.get_protocol()?,
    };

    let ctx = match cmd.request_id {
        Some(id) => InvocationContext::new(id),
        None => InvocationContext::generated(),
    };

    let registry = Arc::new(build_registry(config)?);
    let store = build_store(config).await?;
    let pipeline = RefreshPipeline::new(registry, store, config.cache.get_key_prefix());

    let outcome = pipeline
        .run(&ctx, network, protocol)
        .await
        .with_context(|| format!("Refresh {} for network {} failed", protocol, network))?;

    match outcome {
        RefreshOutcome::Cached { key, pool_count, .. } => {
            println!("Cached {} {} pools for {} to {}", pool_count, protocol, network, key);
        }
        RefreshOutcome::NoPools { .. } => {
            println!("No {} pools found for {}; existing snapshot left in place", protocol, network);
        }
    }

    Ok(())
}

fn bindings_command(cmd: BindingsCmd, config: &Config) -> Result<()> {
    let prefix = config.cache.get_key_prefix();

    if cmd.format == "json" {
        let rows: Vec<serde_json::Value> = config
            .providers
            .iter()
            .map(|p| {
                serde_json::json!({
                    "network": p.network,
                    "protocol": p.protocol,
                    "subgraphUrl": p.subgraph_url,
                    "key": SnapshotKey::derive(&prefix, p.network, p.protocol),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if config.providers.is_empty() {
        println!("No providers configured");
        return Ok(());
    }

    for p in &config.providers {
        println!(
            "{:<10} {:<3} {:<30} {}",
            p.network.name().map_or_else(|| p.network.to_string(), |n| format!("{} ({})", p.network, n)),
            p.protocol,
            SnapshotKey::derive(&prefix, p.network, p.protocol),
            p.subgraph_url
        );
    }

    Ok(())
}

fn key_command(cmd: KeyCmd, config: &Config) -> Result<()> {
    let key = SnapshotKey::derive(&config.cache.get_key_prefix(), cmd.network, cmd.protocol);
    println!("{}", key);
    Ok(())
}
