//! CLI command implementations.

pub mod bench;
pub mod config;
pub mod invoke;
pub mod serve;

use clap::{Args, Subcommand};

/// Arguments for the invoke command.
#[derive(Args)]
pub struct InvokeArgs {
    /// Query string, e.g. "workload=cpu&iterations=1000".
    #[arg(default_value = "")]
    pub query: String,

    /// HTTP method to report.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Override the runtime identifier.
    #[arg(long)]
    pub runtime: Option<String>,
}

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address (default: serve.addr from config).
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Route to mount the responder on (default: serve.route from config).
    #[arg(short, long)]
    pub route: Option<String>,

    /// Override the runtime identifier.
    #[arg(long)]
    pub runtime: Option<String>,
}

/// Arguments for the bench command.
#[derive(Args)]
pub struct BenchArgs {
    /// Query string sent with every invocation.
    #[arg(default_value = "workload=cpu")]
    pub query: String,

    /// Total number of invocations.
    #[arg(short = 'n', long, default_value = "100")]
    pub requests: usize,

    /// Maximum invocations in flight.
    #[arg(short, long, default_value = "8")]
    pub concurrency: usize,

    /// HTTP method to report.
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Write a default edge-bench.toml.
    Init {
        /// Overwrite without asking.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
