//! Orbscan CLI - Command-line interface
//!
//! Simulates survey campaigns with the orbscan library and inspects the
//! scan state files they save.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::inspect::InspectArgs;
use commands::simulate::SimulateArgs;

#[derive(Parser)]
#[command(name = "orbscan", version, about = "Orbital ground-coverage scanning")]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly a simulated survey campaign and report coverage.
    Simulate(SimulateArgs),
    /// Summarize a saved scan state file.
    Inspect(InspectArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Simulate(args) => commands::simulate::run(args).map(|_| ()),
        Commands::Inspect(args) => commands::inspect::run(args).map(|_| ()),
    };

    if let Err(e) = result {
        e.exit();
    }
}
