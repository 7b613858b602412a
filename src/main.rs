//! pool-cache - scheduled pool snapshot refresh
//!
//! Loads configuration, installs the log subscriber and runs one command.
//! Any error exits non-zero so the scheduler records a failed invocation.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use pool_snapshot_cache::adapters::cli::{self, CliApp};
use pool_snapshot_cache::config::{load_config, LoggingSection};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (deployment overrides go here)
    dotenvy::dotenv().ok();

    let app: CliApp = cli::init();
    let config = load_config(&app.config)
        .with_context(|| format!("Failed to load configuration from {}", app.config.display()))?;

    init_logging(&config.logging, app.verbose, app.debug, app.json_logs)?;

    cli::execute(app, config).await
}

fn init_logging(logging: &LoggingSection, verbose: bool, debug: bool, json: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    if json || logging.json {
        fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
    } else {
        fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;
    }

    Ok(())
}
