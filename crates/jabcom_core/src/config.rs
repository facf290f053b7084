//! Datastore configuration.

use jabcom_storage::FileOptions;

/// Configuration for opening a file-backed datastore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Whether to create the store directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync the record log on every write (safer but slower).
    pub sync_on_write: bool,

    /// Whether to compact the record log right after opening.
    pub compact_on_open: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
            compact_on_open: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync the log on every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether to compact the log when opening.
    #[must_use]
    pub const fn compact_on_open(mut self, value: bool) -> Self {
        self.compact_on_open = value;
        self
    }

    pub(crate) fn file_options(&self) -> FileOptions {
        FileOptions {
            create_if_missing: self.create_if_missing,
            sync_on_write: self.sync_on_write,
        }
    }
}
