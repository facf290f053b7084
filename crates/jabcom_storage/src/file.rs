//! File-based storage backend for persistent storage.
//!
//! ## Directory Layout
//!
//! ```text
//! store/
//! ├─ LOCK          # Advisory lock for single-process access
//! └─ records.log   # Append-only log of checksummed entries
//! ```

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use crate::log::{scan, LogEntry};
use crate::table::RecordTable;
use fs2::FileExt;
use jabcom_codec::{Key, Record};
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lock file name.
const LOCK_FILE: &str = "LOCK";

/// Record log file name.
const LOG_FILE: &str = "records.log";

/// Temporary file written during compaction.
const COMPACT_FILE: &str = "records.log.compact";

/// Options for opening a [`FileBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Create the store directory if it does not exist.
    pub create_if_missing: bool,
    /// Sync the log to disk after every write.
    pub sync_on_write: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
        }
    }
}

/// Statistics from a log compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactStats {
    /// Live records written to the new log.
    pub records: usize,
    /// Log size before compaction.
    pub bytes_before: u64,
    /// Log size after compaction.
    pub bytes_after: u64,
}

/// A file-based storage backend.
///
/// Every mutation is appended to `records.log` before it becomes visible;
/// the full record table is kept in memory and rebuilt by replaying the log
/// on open.
///
/// # Durability
///
/// With `sync_on_write`, each write is followed by `File::sync_data()`.
/// A partially written entry at the end of the log (torn write) is dropped
/// on the next open.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. The
/// directory is locked exclusively while the backend is open, so a second
/// open of the same directory fails with [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use jabcom_codec::{Key, Record};
/// use jabcom_storage::{FileBackend, FileOptions, StorageBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("store"), FileOptions::default()).unwrap();
/// let key = backend.put(Record::new(Key::incomplete("Note").unwrap())).unwrap();
/// backend.close();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    sync_on_write: bool,
    state: RwLock<Option<OpenState>>,
}

#[derive(Debug)]
struct OpenState {
    table: RecordTable,
    log: File,
    log_len: u64,
    _lock_file: File,
}

impl OpenState {
    /// Appends an entry, rolling the file back if the write or sync fails.
    fn append(&mut self, entry: &LogEntry, sync: bool) -> StorageResult<()> {
        self.append_with(entry, |log, data| {
            log.write_all(data)?;
            if sync {
                log.sync_data()?;
            }
            Ok(())
        })
    }

    fn append_with(
        &mut self,
        entry: &LogEntry,
        write: impl FnOnce(&mut File, &[u8]) -> io::Result<()>,
    ) -> StorageResult<()> {
        let data = entry.encode()?;
        if let Err(err) = write(&mut self.log, &data) {
            // Leave no unacknowledged bytes in front of later entries.
            let _ = self.log.set_len(self.log_len);
            return Err(err.into());
        }
        self.log_len += data.len() as u64;
        Ok(())
    }
}

fn apply(table: &mut RecordTable, entry: LogEntry) {
    match entry {
        LogEntry::Put(record) => table.insert(record),
        LogEntry::Remove(key) => {
            table.remove(&key);
        }
        LogEntry::Reserve { scope, last } => table.reserve(scope, last),
    }
}

impl FileBackend {
    /// Opens or creates a file store in the directory `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another process holds the lock (returns [`StorageError::Locked`])
    /// - The log is corrupted
    /// - I/O errors occur
    pub fn open(path: &Path, options: FileOptions) -> StorageResult<Self> {
        if !path.exists() {
            if options.create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StorageError::NotFound(path.display().to_string()));
            }
        }
        if !path.is_dir() {
            return Err(StorageError::NotFound(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;
        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let log_path = path.join(LOG_FILE);
        let data = match fs::read(&log_path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        let scan = scan(&data)?;

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        if scan.is_torn(data.len()) {
            tracing::warn!(
                path = %log_path.display(),
                dropped = data.len() - scan.valid_len,
                "truncating torn entry at end of record log"
            );
            log.set_len(scan.valid_len as u64)?;
            log.sync_all()?;
        }

        let mut table = RecordTable::new();
        let entries = scan.entries.len();
        for entry in scan.entries {
            apply(&mut table, entry);
        }
        tracing::info!(
            path = %path.display(),
            records = table.len(),
            entries,
            "opened file store"
        );

        Ok(Self {
            path: path.to_path_buf(),
            sync_on_write: options.sync_on_write,
            state: RwLock::new(Some(OpenState {
                table,
                log,
                log_len: scan.valid_len as u64,
                _lock_file: lock_file,
            })),
        })
    }

    /// Returns the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the record log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.path.join(LOG_FILE)
    }

    /// Returns the current size of the record log in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed.
    pub fn log_size(&self) -> StorageResult<u64> {
        let state = self.state.read();
        let state = state.as_ref().ok_or(StorageError::Unavailable)?;
        Ok(state.log_len)
    }

    /// Returns true until [`close`](Self::close) is called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }

    /// Closes the store and releases the directory lock.
    ///
    /// Every later call fails with [`StorageError::Unavailable`].
    pub fn close(&self) {
        if self.state.write().take().is_some() {
            tracing::debug!(path = %self.path.display(), "closed file store");
        }
    }

    /// Rewrites the log so it holds only live records and id reservations.
    ///
    /// Insertion order and id allocation are preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or I/O fails. On error the
    /// previous log stays in place.
    pub fn compact(&self) -> StorageResult<CompactStats> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Unavailable)?;

        let compact_path = self.path.join(COMPACT_FILE);
        let mut data = Vec::new();
        for (scope, last) in state.table.allocations() {
            data.extend(
                LogEntry::Reserve {
                    scope: scope.clone(),
                    last,
                }
                .encode()?,
            );
        }
        for record in state.table.iter() {
            data.extend(LogEntry::Put(record.clone()).encode()?);
        }

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&compact_path)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        // Open the handle before the rename so a failure leaves the old log in use.
        let log = OpenOptions::new().append(true).open(&compact_path)?;
        fs::rename(&compact_path, self.log_path())?;
        sync_directory(&self.path)?;

        state.log = log;
        let stats = CompactStats {
            records: state.table.len(),
            bytes_before: state.log_len,
            bytes_after: data.len() as u64,
        };
        state.log_len = stats.bytes_after;

        tracing::info!(
            path = %self.path.display(),
            records = stats.records,
            bytes_before = stats.bytes_before,
            bytes_after = stats.bytes_after,
            "compacted record log"
        );
        Ok(stats)
    }

    fn read<R>(&self, f: impl FnOnce(&RecordTable) -> R) -> StorageResult<R> {
        let state = self.state.read();
        let state = state.as_ref().ok_or(StorageError::Unavailable)?;
        Ok(f(&state.table))
    }
}

#[cfg(unix)]
fn sync_directory(path: &Path) -> StorageResult<()> {
    File::open(path)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_path: &Path) -> StorageResult<()> {
    // Directory fsync is not supported on this platform
    Ok(())
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &Key) -> StorageResult<Option<Record>> {
        self.read(|table| table.get(key).cloned())
    }

    fn put(&self, mut record: Record) -> StorageResult<Key> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Unavailable)?;

        let key = state.table.complete_key(record.key())?;
        record.set_key(key.clone());
        let entry = LogEntry::Put(record);
        state.append(&entry, self.sync_on_write)?;
        apply(&mut state.table, entry);

        tracing::debug!(key = %key, "put record");
        Ok(key)
    }

    fn remove(&self, key: &Key) -> StorageResult<()> {
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or(StorageError::Unavailable)?;

        if state.table.get(key).is_none() {
            return Ok(());
        }
        let entry = LogEntry::Remove(key.clone());
        state.append(&entry, self.sync_on_write)?;
        apply(&mut state.table, entry);

        tracing::debug!(key = %key, "removed record");
        Ok(())
    }

    fn query_by_ancestor(&self, ancestor: &Key, kind: &str) -> StorageResult<Vec<Record>> {
        self.read(|table| table.query_by_ancestor(ancestor, kind))
    }

    fn scan_kind(&self, kind: &str) -> StorageResult<Vec<Record>> {
        self.read(|table| table.scan_kind(kind))
    }

    fn scan_all(&self) -> StorageResult<Vec<Record>> {
        self.read(|table| table.iter().cloned().collect())
    }

    fn len(&self) -> StorageResult<usize> {
        self.read(RecordTable::len)
    }
}
