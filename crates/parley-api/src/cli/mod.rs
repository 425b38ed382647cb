//! CLI command definitions for the `parley` binary.

pub mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Speech conversation relay for English practice.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the toml configuration file (optional).
    #[arg(long, global = true, env = "PARLEY_CONFIG", default_value = "parley.toml")]
    pub config: PathBuf,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server.
    Serve {
        /// Port to listen on (overrides PORT and the config file).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides HOST and the config file).
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the effective configuration (API key redacted).
    Config,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
