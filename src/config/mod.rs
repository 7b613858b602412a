//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, CacheSection, JobSection, LoggingSection, ProviderSection,
    StorageBackend, load_config,
};
