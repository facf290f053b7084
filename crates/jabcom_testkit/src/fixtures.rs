//! Test fixtures and datastore helpers.
//!
//! Provides the entity types used across the test suites and convenience
//! functions for setting up test datastores.

use jabcom_codec::Key;
use jabcom_core::{Config, Dao, Datastore, Entity, EntitySchema};
use jabcom_storage::InMemoryBackend;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A root entity with a name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestParentObject {
    /// Identity.
    pub key: Option<Key>,
    /// Display name.
    pub name: String,
}

impl TestParentObject {
    /// Creates an unsaved parent.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            key: None,
            name: name.into(),
        }
    }
}

impl Entity for TestParentObject {
    fn schema() -> EntitySchema<Self> {
        EntitySchema::new()
            .identity("key", |p: &Self| p.key.clone(), |p, k| p.key = k)
            .field("name", |p: &Self| p.name.clone(), |p, v| p.name = v)
            .default_factory()
    }
}

/// An entity stored below a [`TestParentObject`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestChildObject {
    /// Identity.
    pub key: Option<Key>,
    /// Parent key, used when the child has no key yet.
    pub parent: Option<Key>,
    /// Display name.
    pub name: String,
    /// Optional position.
    pub rank: Option<i64>,
}

impl TestChildObject {
    /// Creates an unsaved child below `parent`.
    pub fn below(parent: &Key, name: impl Into<String>) -> Self {
        Self {
            key: None,
            parent: Some(parent.clone()),
            name: name.into(),
            rank: None,
        }
    }
}

impl Entity for TestChildObject {
    fn schema() -> EntitySchema<Self> {
        EntitySchema::new()
            .identity("key", |c: &Self| c.key.clone(), |c, k| c.key = k)
            .parent("parent", |c: &Self| c.parent.clone(), |c, k| c.parent = k)
            .field("name", |c: &Self| c.name.clone(), |c, v| c.name = v)
            .field("rank", |c: &Self| c.rank, |c, v| c.rank = v)
            .default_factory()
    }
}

/// An entity that registers no factory at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoFactoryObject {
    /// Identity.
    pub key: Option<Key>,
}

impl Entity for NoFactoryObject {
    fn schema() -> EntitySchema<Self> {
        EntitySchema::new().identity("key", |o: &Self| o.key.clone(), |o, k| o.key = k)
    }
}

/// An entity whose only constructor is private to this module and therefore
/// not available to the mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateFactoryObject {
    /// Identity.
    pub key: Option<Key>,
    label: String,
}

impl PrivateFactoryObject {
    fn hidden(label: &str) -> Self {
        Self {
            key: None,
            label: label.to_string(),
        }
    }

    /// Returns a value built through the private constructor.
    pub fn sample() -> Self {
        Self::hidden("sample")
    }
}

impl Entity for PrivateFactoryObject {
    fn schema() -> EntitySchema<Self> {
        EntitySchema::new()
            .identity("key", |o: &Self| o.key.clone(), |o, k| o.key = k)
            .field("label", |o: &Self| o.label.clone(), |o, v| o.label = v)
    }
}

/// A test datastore with automatic cleanup.
pub struct TestDatastore {
    /// The datastore instance.
    pub datastore: Datastore,
    /// The in-memory backend, when the datastore uses one.
    backend: Option<Arc<InMemoryBackend>>,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatastore {
    /// Creates a new in-memory test datastore.
    pub fn memory() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        Self {
            datastore: Datastore::with_backend(backend.clone()),
            backend: Some(backend),
            temp_dir: None,
        }
    }

    /// Creates a new file-based test datastore in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let datastore = Datastore::open(temp_dir.path(), Config::default())
            .expect("Failed to open file datastore");
        Self {
            datastore,
            backend: None,
            temp_dir: Some(temp_dir),
        }
    }

    /// Closes and reopens a file-based datastore on the same directory.
    ///
    /// # Panics
    ///
    /// Panics for in-memory datastores.
    pub fn reopen(self) -> Self {
        let temp_dir = self.temp_dir.expect("Only file datastores can be reopened");
        self.datastore.close();
        drop(self.datastore);
        let datastore = Datastore::open(temp_dir.path(), Config::default())
            .expect("Failed to reopen file datastore");
        Self {
            datastore,
            backend: None,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the in-memory backend, for stopping and restarting it.
    pub fn memory_backend(&self) -> Option<&Arc<InMemoryBackend>> {
        self.backend.as_ref()
    }

    /// Returns the store directory if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.temp_dir.as_ref().map(TempDir::path)
    }
}

impl std::ops::Deref for TestDatastore {
    type Target = Datastore;

    fn deref(&self) -> &Self::Target {
        &self.datastore
    }
}

/// Runs a test with a temporary in-memory datastore.
pub fn with_temp_datastore<F, R>(f: F) -> R
where
    F: FnOnce(&Datastore) -> R,
{
    let test_store = TestDatastore::memory();
    f(&test_store.datastore)
}

/// Runs a test with a temporary file-based datastore.
pub fn with_file_datastore<F, R>(f: F) -> R
where
    F: FnOnce(&Datastore, &Path) -> R,
{
    let test_store = TestDatastore::file();
    let path = test_store
        .path()
        .expect("File datastore should have a path")
        .to_path_buf();
    f(&test_store.datastore, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// Creates a datastore holding one parent and `names.len()` children
    /// below it, saved in order. Returns the parent key and the child keys.
    pub fn parent_with_children(names: &[&str]) -> (TestDatastore, Key, Vec<Key>) {
        let test_store = TestDatastore::memory();
        let parent_key = test_store
            .dao::<TestParentObject>()
            .save(&mut TestParentObject::named("parent"))
            .expect("Failed to save parent");

        let children = test_store.dao::<TestChildObject>();
        let keys = names
            .iter()
            .map(|name| {
                children
                    .save(&mut TestChildObject::below(&parent_key, *name))
                    .expect("Failed to save child")
            })
            .collect();

        (test_store, parent_key, keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jabcom_core::MappingError;

    #[test]
    fn test_memory_datastore() {
        let test_store = TestDatastore::memory();
        assert!(test_store.path().is_none());
        assert!(test_store.memory_backend().is_some());
        assert_eq!(test_store.backend().len().unwrap(), 0);
    }

    #[test]
    fn test_file_datastore_reopen() {
        let test_store = TestDatastore::file();
        let key = test_store
            .dao::<TestParentObject>()
            .save(&mut TestParentObject::named("kept"))
            .unwrap();

        let test_store = test_store.reopen();
        let parent = test_store
            .dao::<TestParentObject>()
            .fetch_by_key(&key)
            .unwrap()
            .unwrap();
        assert_eq!(parent.name, "kept");
    }

    #[test]
    fn test_populated_scenario() {
        let (test_store, parent, keys) = scenarios::parent_with_children(&["a", "b"]);
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| k.parent().as_ref() == Some(&parent)));
        assert_eq!(test_store.backend().len().unwrap(), 3);
    }

    #[test]
    fn test_uninstantiable_fixtures() {
        with_temp_datastore(|datastore| {
            assert!(matches!(
                datastore.mapper::<NoFactoryObject>().validate(),
                Err(MappingError::NotInstantiable { .. })
            ));
            assert!(matches!(
                datastore.mapper::<PrivateFactoryObject>().validate(),
                Err(MappingError::NotInstantiable { .. })
            ));
        });
        assert_eq!(PrivateFactoryObject::sample().label, "sample");
    }
}
