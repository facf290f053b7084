//! Field descriptors for entity types.

use jabcom_codec::{FieldValue, Key, Value};

pub(crate) type KeyGetter<T> = Box<dyn Fn(&T) -> Option<Key> + Send + Sync>;
pub(crate) type KeySetter<T> = Box<dyn Fn(&mut T, Option<Key>) + Send + Sync>;
pub(crate) type ValueGetter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
/// Returns the rejected value when it has the wrong type.
pub(crate) type ValueSetter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), Value> + Send + Sync>;
pub(crate) type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

/// A field holding a [`Key`]: the identity or the parent.
pub(crate) struct KeyField<T> {
    pub(crate) name: String,
    pub(crate) get: KeyGetter<T>,
    pub(crate) set: KeySetter<T>,
}

/// A plain property stored as a record field.
pub(crate) struct Property<T> {
    pub(crate) name: String,
    pub(crate) type_name: &'static str,
    pub(crate) get: ValueGetter<T>,
    pub(crate) set: ValueSetter<T>,
}

/// Describes how an entity type maps onto a record.
///
/// A schema lists the identity field, an optional parent field, the plain
/// properties and a factory producing blank instances. Accessors are plain
/// closures, so private fields can be mapped without exposing them.
///
/// The schema is checked when an [`EntityMapper`](super::EntityMapper) is
/// built: exactly one identity field, at most one parent field, unique
/// field names and a factory are required.
///
/// # Example
///
/// ```rust
/// use jabcom_codec::Key;
/// use jabcom_core::{Entity, EntitySchema};
///
/// #[derive(Default)]
/// struct Note {
///     key: Option<Key>,
///     folder: Option<Key>,
///     title: String,
/// }
///
/// impl Entity for Note {
///     fn schema() -> EntitySchema<Self> {
///         EntitySchema::new()
///             .identity("key", |n: &Note| n.key.clone(), |n, k| n.key = k)
///             .parent("folder", |n: &Note| n.folder.clone(), |n, k| n.folder = k)
///             .field("title", |n: &Note| n.title.clone(), |n, v| n.title = v)
///             .default_factory()
///     }
/// }
/// ```
pub struct EntitySchema<T> {
    pub(crate) identities: Vec<KeyField<T>>,
    pub(crate) parents: Vec<KeyField<T>>,
    pub(crate) properties: Vec<Property<T>>,
    pub(crate) factory: Option<Factory<T>>,
}

impl<T: 'static> EntitySchema<T> {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identities: Vec::new(),
            parents: Vec::new(),
            properties: Vec::new(),
            factory: None,
        }
    }

    /// Declares the identity field, which holds the entity's key.
    #[must_use]
    pub fn identity(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Option<Key> + Send + Sync + 'static,
        set: impl Fn(&mut T, Option<Key>) + Send + Sync + 'static,
    ) -> Self {
        self.identities.push(KeyField {
            name: name.into(),
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Declares the parent field.
    ///
    /// When the entity has no key yet, a new key is created below the parent.
    /// On read the field is filled from the record key's parent.
    #[must_use]
    pub fn parent(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&T) -> Option<Key> + Send + Sync + 'static,
        set: impl Fn(&mut T, Option<Key>) + Send + Sync + 'static,
    ) -> Self {
        self.parents.push(KeyField {
            name: name.into(),
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Declares a property stored under `name`.
    #[must_use]
    pub fn field<V>(
        mut self,
        name: impl Into<String>,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: FieldValue + 'static,
    {
        self.properties.push(Property {
            name: name.into(),
            type_name: V::TYPE_NAME,
            get: Box::new(move |object: &T| get(object).into_value()),
            set: Box::new(move |object: &mut T, value: Value| {
                set(object, V::from_value(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Registers the function creating blank instances.
    #[must_use]
    pub fn factory(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Uses [`Default`] to create blank instances.
    #[must_use]
    pub fn default_factory(self) -> Self
    where
        T: Default,
    {
        self.factory(T::default)
    }

    /// Returns the names of all declared fields, in declaration order by role.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.identities
            .iter()
            .chain(&self.parents)
            .map(|f| f.name.as_str())
            .chain(self.properties.iter().map(|p| p.name.as_str()))
            .collect()
    }
}

impl<T: 'static> Default for EntitySchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for EntitySchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntitySchema")
            .field("fields", &self.field_names())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}
