//! CLI error type.

use jabcom_codec::KeyError;
use jabcom_core::CoreError;
use jabcom_storage::StorageError;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs `--path`.
    #[error("store path required for {0} (use --path)")]
    MissingPath(&'static str),

    /// The store could not be opened or read.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend call failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A key argument is malformed.
    #[error("invalid key argument: {0}")]
    Key(#[from] KeyError),

    /// JSON output failed.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}
