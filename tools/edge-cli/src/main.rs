//! Edge CLI - Command line tool for the edge workload responder.
//!
//! Commands:
//! - `edge invoke` - Run one invocation in-process
//! - `edge serve` - Run the native HTTP host
//! - `edge bench` - Fire concurrent invocations and report timings
//! - `edge config` - Manage configuration

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BenchArgs, ConfigArgs, InvokeArgs, ServeArgs};

/// Edge CLI - Run and benchmark synthetic cpu/io/delay workloads
#[derive(Parser)]
#[command(name = "edge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single invocation and print the response
    Invoke(InvokeArgs),

    /// Serve the responder over HTTP
    Serve(ServeArgs),

    /// Benchmark concurrent invocations
    Bench(BenchArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Invoke(args) => commands::invoke::run(args, &ctx).await,
        Commands::Serve(args) => commands::serve::run(args, &ctx).await,
        Commands::Bench(args) => commands::bench::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
