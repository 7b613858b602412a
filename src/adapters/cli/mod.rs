//! CLI Adapter
//!
//! Command-line interface for the pool snapshot cache job.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{build_registry, execute, BindingsCmd, CliApp, Command, KeyCmd, RefreshCmd};

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}
