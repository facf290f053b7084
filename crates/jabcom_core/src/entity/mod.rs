//! Entity types and their record mapping.

mod mapper;
mod schema;

pub use mapper::EntityMapper;
pub use schema::EntitySchema;

/// Trait for types that can be stored through a DAO.
///
/// Implementors describe their fields with an [`EntitySchema`]. The schema
/// must declare exactly one identity field and a factory; it may declare one
/// parent field and any number of properties.
///
/// # Example
///
/// ```rust
/// use jabcom_codec::Key;
/// use jabcom_core::{Entity, EntitySchema};
///
/// #[derive(Default)]
/// struct User {
///     key: Option<Key>,
///     name: String,
///     age: u32,
/// }
///
/// impl Entity for User {
///     fn schema() -> EntitySchema<Self> {
///         EntitySchema::new()
///             .identity("key", |u: &User| u.key.clone(), |u, k| u.key = k)
///             .field("name", |u: &User| u.name.clone(), |u, v| u.name = v)
///             .field("age", |u: &User| u.age, |u, v| u.age = v)
///             .default_factory()
///     }
/// }
///
/// assert_eq!(User::kind(), "User");
/// ```
pub trait Entity: Sized + 'static {
    /// Returns the kind used for this type's keys.
    ///
    /// Defaults to the type's name without its module path.
    fn kind() -> &'static str {
        short_type_name::<Self>()
    }

    /// Returns the field mapping of this type.
    fn schema() -> EntitySchema<Self>;
}

/// Returns the last path segment of a type name, ignoring generic arguments.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    struct Wrapper<T>(std::marker::PhantomData<T>);

    #[test]
    fn short_names() {
        assert_eq!(short_type_name::<Plain>(), "Plain");
        assert_eq!(short_type_name::<Wrapper<Plain>>(), "Wrapper");
        assert_eq!(short_type_name::<u32>(), "u32");
    }
}
