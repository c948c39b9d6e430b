//! CLI error type.

use sharedlib::config::ConfigError;
use sharedlib::fileset::ResolverError;
use thiserror::Error;

/// Errors surfaced to the user by `sharedlib` subcommands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Fileset resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Timed out after {secs}s with {outstanding} fileset(s) unresolved")]
    Timeout { secs: u64, outstanding: usize },

    #[error("Resolution failed: {0}")]
    Resolution(String),

    #[error("Configuration check found {0} problem(s)")]
    CheckFailed(usize),

    #[error("Failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}
