//! Error types for storage operations.

use jabcom_codec::{CodecError, KeyError};
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend is not running (stopped emulator, closed store).
    #[error("storage backend is unavailable")]
    Unavailable,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The storage file is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// A stored record could not be encoded or decoded.
    #[error("record codec error: {0}")]
    Codec(#[from] CodecError),

    /// A stored key string is malformed.
    #[error("invalid stored key: {0}")]
    Key(#[from] KeyError),

    /// Every id of a `(parent, kind)` scope has been handed out.
    #[error("no ids left in scope {scope}")]
    IdsExhausted {
        /// Encoded scope key.
        scope: String,
    },

    /// Another process holds the store's lock.
    #[error("storage directory is locked by another process")]
    Locked,

    /// The store directory is missing and creation was not requested.
    #[error("storage directory does not exist: {0}")]
    NotFound(String),
}

impl StorageError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }
}
