// Error taxonomy shared by the command handlers.
//
// Handlers return `anyhow::Result` like the API client does; the variants
// below ride inside `anyhow::Error` and are recovered in `main` to pick the
// message and the exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Failure classes a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad flag combination, out-of-range selection, malformed index.
    #[error("{0}")]
    UserInput(String),

    /// No value could be resolved for a required key.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A file or directory given by the user does not exist or has the wrong kind.
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The user backed out (Escape, Ctrl-C, "q", declined confirmation).
    #[error("Aborted.")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UserInput(_) => 2,
            CliError::Cancelled => 130,
            CliError::Config(ConfigError::AmbiguousScope) => 2,
            _ => 1,
        }
    }
}

/// Exit code for an arbitrary handler error.
///
/// Config errors may arrive bare (through `?` on a store call) or wrapped in
/// `CliError::Config`; both classify the same way.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::AmbiguousScope) => 2,
        _ => 1,
    }
}
