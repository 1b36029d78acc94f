//! CLI error type.

use orbscan::config::ConfigError;
use orbscan::persistence::PersistenceError;
use thiserror::Error;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Scan configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scan state could not be saved or loaded.
    #[error("Scan state error: {0}")]
    Persistence(#[from] PersistenceError),

    /// A command-line argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Print the error and exit with a failure status.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        std::process::exit(1);
    }
}
