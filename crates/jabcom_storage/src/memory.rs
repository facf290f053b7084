//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::table::RecordTable;
use jabcom_codec::{Key, Record};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// An in-memory storage backend.
///
/// This backend stores all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral datastores that don't need persistence
///
/// It also emulates a local datastore service: [`stop`](Self::stop) makes
/// every operation fail with [`StorageError::Unavailable`] until
/// [`start`](Self::start) is called. Stored records survive a stop.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. Id
/// assignment happens under the write lock, so concurrent `put`s into one
/// scope get distinct ids.
///
/// # Example
///
/// ```rust
/// use jabcom_codec::{Key, Record};
/// use jabcom_storage::{InMemoryBackend, StorageBackend};
///
/// let backend = InMemoryBackend::new();
/// let key = backend.put(Record::new(Key::incomplete("Note").unwrap())).unwrap();
/// assert!(key.is_complete());
/// assert!(backend.get(&key).unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct InMemoryBackend {
    table: RwLock<RecordTable>,
    running: AtomicBool,
}

impl InMemoryBackend {
    /// Creates a new, running, empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(RecordTable::new()),
            running: AtomicBool::new(true),
        }
    }

    /// Creates a running backend pre-populated with records.
    ///
    /// Useful for testing read paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a record's key cannot be completed.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> StorageResult<Self> {
        let backend = Self::new();
        for record in records {
            backend.put(record)?;
        }
        Ok(backend)
    }

    /// Stops the emulated service. Later calls fail with
    /// [`StorageError::Unavailable`].
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        tracing::debug!("in-memory backend stopped");
    }

    /// Restarts the emulated service.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        tracing::debug!("in-memory backend started");
    }

    /// Returns true if the backend answers requests.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Removes every record. Ids handed out before are still never reused.
    pub fn clear(&self) {
        self.table.write().clear();
    }

    fn ensure_running(&self) -> StorageResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(StorageError::Unavailable)
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn get(&self, key: &Key) -> StorageResult<Option<Record>> {
        self.ensure_running()?;
        Ok(self.table.read().get(key).cloned())
    }

    fn put(&self, mut record: Record) -> StorageResult<Key> {
        self.ensure_running()?;
        let mut table = self.table.write();
        let key = table.complete_key(record.key())?;
        record.set_key(key.clone());
        table.insert(record);
        tracing::debug!(key = %key, "put record");
        Ok(key)
    }

    fn remove(&self, key: &Key) -> StorageResult<()> {
        self.ensure_running()?;
        if self.table.write().remove(key) {
            tracing::debug!(key = %key, "removed record");
        }
        Ok(())
    }

    fn query_by_ancestor(&self, ancestor: &Key, kind: &str) -> StorageResult<Vec<Record>> {
        self.ensure_running()?;
        Ok(self.table.read().query_by_ancestor(ancestor, kind))
    }

    fn scan_kind(&self, kind: &str) -> StorageResult<Vec<Record>> {
        self.ensure_running()?;
        Ok(self.table.read().scan_kind(kind))
    }

    fn scan_all(&self) -> StorageResult<Vec<Record>> {
        self.ensure_running()?;
        Ok(self.table.read().iter().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        self.ensure_running()?;
        Ok(self.table.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jabcom_codec::{KeyId, Value};
    use std::sync::Arc;
    use std::thread;

    fn parent_key() -> Key {
        Key::from_name("TestParentObject", "xyz").unwrap()
    }

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.len().unwrap(), 0);
        assert!(backend.is_empty().unwrap());
        assert!(backend.is_running());
    }

    #[test]
    fn memory_put_and_get() {
        let backend = InMemoryBackend::new();
        let record = Record::new(parent_key())
            .with("propertyOne", 999)
            .with("propertyTwo", "foo");

        let key = backend.put(record.clone()).unwrap();
        assert_eq!(key, parent_key());
        assert_eq!(backend.get(&key).unwrap(), Some(record));
    }

    #[test]
    fn memory_get_missing_is_none() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.get(&parent_key()).unwrap(), None);
    }

    #[test]
    fn memory_put_assigns_id() {
        let backend = InMemoryBackend::new();
        let key = backend
            .put(Record::new(Key::incomplete("Note").unwrap()))
            .unwrap();
        assert_eq!(key.id(), Some(&KeyId::Id(1)));

        let stored = backend.get(&key).unwrap().unwrap();
        assert_eq!(stored.key(), &key);
    }

    #[test]
    fn memory_remove_is_idempotent() {
        let backend = InMemoryBackend::new();
        let key = backend.put(Record::new(parent_key())).unwrap();

        backend.remove(&key).unwrap();
        backend.remove(&key).unwrap();
        assert_eq!(backend.get(&key).unwrap(), None);
    }

    #[test]
    fn memory_query_by_ancestor_in_insertion_order() {
        let backend = InMemoryBackend::new();
        let parent = parent_key();
        backend.put(Record::new(parent.clone())).unwrap();

        let child_scope = parent.incomplete_child("TestChildObject").unwrap();
        let c1 = backend
            .put(Record::new(child_scope.clone()).with("name", "first"))
            .unwrap();
        let c2 = backend
            .put(Record::new(child_scope).with("name", "second"))
            .unwrap();

        let children = backend
            .query_by_ancestor(&parent, "TestChildObject")
            .unwrap();
        let keys: Vec<&Key> = children.iter().map(Record::key).collect();
        assert_eq!(keys, vec![&c1, &c2]);
        assert_eq!(children[0].get("name"), Some(&Value::from("first")));
    }

    #[test]
    fn memory_scan_all_spans_kinds() {
        let backend = InMemoryBackend::new();
        let parent = backend.put(Record::new(parent_key())).unwrap();
        let note = backend
            .put(Record::new(Key::incomplete("Note").unwrap()))
            .unwrap();

        let keys: Vec<Key> = backend
            .scan_all()
            .unwrap()
            .into_iter()
            .map(|r| r.key().clone())
            .collect();
        assert_eq!(keys, vec![parent, note]);
    }

    #[test]
    fn memory_stop_makes_calls_unavailable() {
        let backend = InMemoryBackend::new();
        let key = backend.put(Record::new(parent_key())).unwrap();

        backend.stop();
        assert!(matches!(backend.get(&key), Err(StorageError::Unavailable)));
        assert!(matches!(
            backend.put(Record::new(parent_key())),
            Err(StorageError::Unavailable)
        ));
        assert!(matches!(backend.remove(&key), Err(StorageError::Unavailable)));
        assert!(matches!(backend.len(), Err(StorageError::Unavailable)));

        backend.start();
        assert!(backend.get(&key).unwrap().is_some());
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::new();
        backend
            .put(Record::new(Key::incomplete("Note").unwrap()))
            .unwrap();
        backend.clear();
        assert!(backend.is_empty().unwrap());

        let key = backend
            .put(Record::new(Key::incomplete("Note").unwrap()))
            .unwrap();
        assert_eq!(key.id(), Some(&KeyId::Id(2)));
    }

    #[test]
    fn memory_with_records() {
        let backend = InMemoryBackend::with_records([
            Record::new(Key::from_id("Note", 5).unwrap()),
            Record::new(Key::incomplete("Note").unwrap()),
        ])
        .unwrap();
        assert_eq!(backend.len().unwrap(), 2);
        assert!(backend.get(&Key::from_id("Note", 6).unwrap()).unwrap().is_some());
    }

    #[test]
    fn memory_concurrent_puts_get_distinct_ids() {
        let backend = Arc::new(InMemoryBackend::new());
        let scope = parent_key().incomplete_child("TestChildObject").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = Arc::clone(&backend);
                let scope = scope.clone();
                thread::spawn(move || {
                    (0..25)
                        .map(|_| backend.put(Record::new(scope.clone())).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut keys: Vec<Key> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 200);
        assert_eq!(backend.len().unwrap(), 200);
    }
}
