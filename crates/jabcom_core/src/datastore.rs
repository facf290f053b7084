//! Datastore handle.

use crate::config::Config;
use crate::dao::EntityDao;
use crate::entity::{Entity, EntityMapper};
use crate::error::CoreResult;
use jabcom_storage::{CompactStats, FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

type MapperCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// The main datastore handle.
///
/// A `Datastore` owns a storage backend and hands out [`EntityDao`]s for
/// entity types. Entity schemas are checked once per type and shared by
/// every DAO of that type.
///
/// # Opening a Datastore
///
/// ```rust,no_run
/// use jabcom_core::{Config, Datastore};
/// use std::path::Path;
///
/// let datastore = Datastore::open(Path::new("my_store"), Config::default())?;
/// # Ok::<(), jabcom_core::CoreError>(())
/// ```
///
/// # In-Memory Datastores
///
/// For testing, use `Datastore::open_in_memory()`, or
/// [`Datastore::with_backend`] with an [`InMemoryBackend`] you keep a handle
/// to, so you can stop and restart it.
pub struct Datastore {
    /// Configuration.
    config: Config,
    /// Storage backend used by every DAO.
    backend: Arc<dyn StorageBackend>,
    /// The file backend, for file-only operations. None otherwise.
    file: Option<Arc<FileBackend>>,
    /// Resolved entity mappers by type.
    mappers: RwLock<MapperCache>,
}

impl Datastore {
    /// Opens a fresh in-memory datastore.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    /// Opens a datastore over an existing backend.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            config: Config::default(),
            backend,
            file: None,
            mappers: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a file-backed datastore in the directory `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another process has the store locked
    /// - The record log is corrupted
    /// - I/O errors occur
    pub fn open(path: &Path, config: Config) -> CoreResult<Self> {
        let file = Arc::new(FileBackend::open(path, config.file_options())?);
        if config.compact_on_open {
            file.compact()?;
        }
        let backend: Arc<dyn StorageBackend> = file.clone();
        Ok(Self {
            config,
            backend,
            file: Some(file),
            mappers: RwLock::new(HashMap::new()),
        })
    }

    /// Returns a DAO for entities of type `T`.
    #[must_use]
    pub fn dao<T: Entity>(&self) -> EntityDao<T> {
        EntityDao::with_mapper(Arc::clone(&self.backend), self.mapper::<T>())
    }

    /// Returns the shared mapper for `T`, building it on first use.
    #[must_use]
    pub fn mapper<T: Entity>(&self) -> Arc<EntityMapper<T>> {
        let type_id = TypeId::of::<T>();
        if let Some(mapper) = self.mappers.read().get(&type_id) {
            if let Ok(mapper) = Arc::clone(mapper).downcast::<EntityMapper<T>>() {
                return mapper;
            }
        }

        let mut mappers = self.mappers.write();
        let entry = mappers.entry(type_id).or_insert_with(|| {
            let mapper: Arc<dyn Any + Send + Sync> = Arc::new(EntityMapper::<T>::new());
            mapper
        });
        // Entries are keyed by TypeId, so the downcast cannot fail.
        Arc::clone(entry)
            .downcast::<EntityMapper<T>>()
            .unwrap_or_else(|_| Arc::new(EntityMapper::new()))
    }

    /// Returns the storage backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns the datastore configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the store directory for file-backed datastores.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref().map(FileBackend::path)
    }

    /// Returns the record log size in bytes, or `None` without a log.
    ///
    /// # Errors
    ///
    /// Returns an error if the datastore was closed.
    pub fn log_size(&self) -> CoreResult<Option<u64>> {
        match &self.file {
            Some(file) => Ok(Some(file.log_size()?)),
            None => Ok(None),
        }
    }

    /// Compacts the record log. Returns `None` for datastores without one.
    ///
    /// # Errors
    ///
    /// Returns an error if compaction fails.
    pub fn compact(&self) -> CoreResult<Option<CompactStats>> {
        match &self.file {
            Some(file) => Ok(Some(file.compact()?)),
            None => Ok(None),
        }
    }

    /// Closes a file-backed datastore and releases its lock.
    ///
    /// Later operations through this datastore or its DAOs fail with
    /// `StorageError::Unavailable`. Does nothing for other backends.
    pub fn close(&self) {
        if let Some(file) = &self.file {
            file.close();
        }
    }
}

impl std::fmt::Debug for Datastore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datastore")
            .field("config", &self.config)
            .field("path", &self.path())
            .field("mappers", &self.mappers.read().len())
            .finish_non_exhaustive()
    }
}
