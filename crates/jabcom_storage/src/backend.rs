//! Storage backend trait definition.

use crate::error::StorageResult;
use jabcom_codec::{Key, Record};

/// A pluggable record store.
///
/// Backends persist [`Record`]s addressed by [`Key`]. They know nothing about
/// entity types; mapping between domain objects and records happens above
/// this layer.
///
/// # Invariants
///
/// - `put` with an incomplete key assigns an id unique within the key's
///   `(parent, kind)` scope and returns the completed key
/// - ids are never handed out twice, even after the record is removed
/// - `remove` of an absent key succeeds
/// - listing operations return records in insertion order; overwriting a key
///   keeps its original position
/// - a backend that is not running answers every call with
///   [`crate::StorageError::Unavailable`]
/// - backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - reference backend and test emulator
/// - [`super::FileBackend`] - persistent log-structured store
pub trait StorageBackend: Send + Sync {
    /// Returns the record stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn get(&self, key: &Key) -> StorageResult<Option<Record>>;

    /// Stores a record, replacing any record with the same key.
    ///
    /// Returns the final key of the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable, the scope has run out
    /// of ids, or the write fails.
    fn put(&self, record: Record) -> StorageResult<Key>;

    /// Removes the record stored under `key`. Removing an absent key is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable or the write fails.
    fn remove(&self, key: &Key) -> StorageResult<()>;

    /// Returns the records of `kind` that have `ancestor` in their ancestor
    /// chain, in insertion order.
    ///
    /// The ancestor itself is never part of the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn query_by_ancestor(&self, ancestor: &Key, kind: &str) -> StorageResult<Vec<Record>>;

    /// Returns every record of `kind`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn scan_kind(&self, kind: &str) -> StorageResult<Vec<Record>>;

    /// Returns every stored record, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn scan_all(&self) -> StorageResult<Vec<Record>>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn len(&self) -> StorageResult<usize>;

    /// Returns true if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unavailable.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
