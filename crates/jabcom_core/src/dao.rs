//! Data access objects.

use crate::entity::{Entity, EntityMapper};
use crate::error::CoreResult;
use jabcom_codec::{decode_key, Key, Record};
use jabcom_storage::StorageBackend;
use std::sync::Arc;

/// Fetch, delete and save entities of type `T` addressed by keys of type `K`.
///
/// String keys are the canonical text form of `K`. A missing entity is
/// `Ok(None)`, never an error, and deleting a missing entity succeeds.
pub trait Dao<K, T> {
    /// Fetches the entity stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type cannot be mapped or the backend
    /// fails.
    fn fetch_by_key(&self, key: &K) -> CoreResult<Option<T>>;

    /// Fetches the entity stored under the key encoded as `key`.
    ///
    /// # Errors
    ///
    /// As [`fetch_by_key`](Self::fetch_by_key), plus a key error if `key` is
    /// malformed.
    fn fetch_by_key_str(&self, key: &str) -> CoreResult<Option<T>>;

    /// Deletes the entity stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type cannot be mapped or the backend
    /// fails.
    fn delete(&self, key: &K) -> CoreResult<()>;

    /// Deletes the entity stored under the key encoded as `key`.
    ///
    /// # Errors
    ///
    /// As [`delete`](Self::delete), plus a key error if `key` is malformed.
    fn delete_str(&self, key: &str) -> CoreResult<()>;

    /// Stores `object` and writes its final key into its identity field.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type cannot be mapped or the backend
    /// fails. On error `object` is left unchanged.
    fn save(&self, object: &mut T) -> CoreResult<K>;
}

/// The [`Dao`] for [`Key`]-addressed entities over a [`StorageBackend`].
///
/// Each operation first checks the entity mapper's cached schema outcome,
/// so an unmappable type fails before the backend is touched.
///
/// # Example
///
/// ```rust
/// use jabcom_codec::Key;
/// use jabcom_core::{Dao, Datastore, Entity, EntitySchema};
///
/// #[derive(Default)]
/// struct Note {
///     key: Option<Key>,
///     text: String,
/// }
///
/// impl Entity for Note {
///     fn schema() -> EntitySchema<Self> {
///         EntitySchema::new()
///             .identity("key", |n: &Note| n.key.clone(), |n, k| n.key = k)
///             .field("text", |n: &Note| n.text.clone(), |n, v| n.text = v)
///             .default_factory()
///     }
/// }
///
/// let datastore = Datastore::open_in_memory();
/// let notes = datastore.dao::<Note>();
///
/// let mut note = Note { key: None, text: "hello".into() };
/// let key = notes.save(&mut note).unwrap();
/// assert_eq!(note.key.as_ref(), Some(&key));
///
/// let fetched = notes.fetch_by_key_str(&key.to_string()).unwrap().unwrap();
/// assert_eq!(fetched.text, "hello");
/// ```
pub struct EntityDao<T: Entity> {
    backend: Arc<dyn StorageBackend>,
    mapper: Arc<EntityMapper<T>>,
}

impl<T: Entity> EntityDao<T> {
    /// Creates a DAO with its own mapper.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_mapper(backend, Arc::new(EntityMapper::new()))
    }

    /// Creates a DAO sharing an existing mapper.
    #[must_use]
    pub fn with_mapper(backend: Arc<dyn StorageBackend>, mapper: Arc<EntityMapper<T>>) -> Self {
        Self { backend, mapper }
    }

    /// Returns the backend this DAO talks to.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Returns the entity mapper.
    #[must_use]
    pub fn mapper(&self) -> &EntityMapper<T> {
        &self.mapper
    }

    /// Returns the kind of `T`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        T::kind()
    }

    /// Fetches every entity of `T`'s kind, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type cannot be mapped or the backend
    /// fails.
    pub fn fetch_all(&self) -> CoreResult<Vec<T>> {
        self.mapper.validate()?;
        let records = self.backend.scan_kind(T::kind())?;
        tracing::debug!(kind = T::kind(), count = records.len(), "fetch all");
        self.records_to_objects(records)
    }

    /// Fetches the entities of `T`'s kind below `ancestor`, in insertion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity type cannot be mapped or the backend
    /// fails.
    pub fn fetch_by_ancestor(&self, ancestor: &Key) -> CoreResult<Vec<T>> {
        self.mapper.validate()?;
        let records = self.backend.query_by_ancestor(ancestor, T::kind())?;
        tracing::debug!(
            kind = T::kind(),
            ancestor = %ancestor,
            count = records.len(),
            "fetch by ancestor"
        );
        self.records_to_objects(records)
    }

    /// Converts records into entities, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that cannot be mapped.
    pub fn records_to_objects(&self, records: Vec<Record>) -> CoreResult<Vec<T>> {
        Ok(self.mapper.records_to_objects(records)?)
    }
}

impl<T: Entity> Dao<Key, T> for EntityDao<T> {
    fn fetch_by_key(&self, key: &Key) -> CoreResult<Option<T>> {
        self.mapper.validate()?;
        let record = self.backend.get(key)?;
        tracing::debug!(key = %key, found = record.is_some(), "fetch by key");
        match record {
            Some(record) => Ok(Some(self.mapper.to_object(&record)?)),
            None => Ok(None),
        }
    }

    fn fetch_by_key_str(&self, key: &str) -> CoreResult<Option<T>> {
        self.mapper.validate()?;
        self.fetch_by_key(&decode_key(key)?)
    }

    fn delete(&self, key: &Key) -> CoreResult<()> {
        self.mapper.validate()?;
        self.backend.remove(key)?;
        tracing::debug!(key = %key, "delete");
        Ok(())
    }

    fn delete_str(&self, key: &str) -> CoreResult<()> {
        self.mapper.validate()?;
        self.delete(&decode_key(key)?)
    }

    fn save(&self, object: &mut T) -> CoreResult<Key> {
        let record = self.mapper.to_record(object)?;
        let key = self.backend.put(record)?;
        self.mapper.set_identity(object, key.clone())?;
        tracing::debug!(key = %key, "save");
        Ok(key)
    }
}

impl<T: Entity> Clone for EntityDao<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            mapper: Arc::clone(&self.mapper),
        }
    }
}

impl<T: Entity> std::fmt::Debug for EntityDao<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDao")
            .field("kind", &T::kind())
            .finish_non_exhaustive()
    }
}
