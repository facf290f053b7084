//! Conversion between entities and records.

use crate::entity::schema::{EntitySchema, Factory, KeyField, Property};
use crate::entity::Entity;
use crate::error::{CoreResult, MappingError, MappingResult};
use jabcom_codec::{Key, Record};
use std::collections::HashSet;

/// Maps entities of type `T` to and from [`Record`]s.
///
/// The schema of `T` is checked once, when the mapper is built. If it is
/// invalid the error is kept and every later call returns it, so an
/// unmappable type fails the same way no matter when or how it is used.
pub struct EntityMapper<T: Entity> {
    schema: Result<Resolved<T>, MappingError>,
}

struct Resolved<T> {
    identity: KeyField<T>,
    parent: Option<KeyField<T>>,
    properties: Vec<Property<T>>,
    factory: Factory<T>,
}

impl<T: Entity> EntityMapper<T> {
    /// Builds a mapper from `T::schema()`.
    #[must_use]
    pub fn new() -> Self {
        Self::from_schema(T::schema())
    }

    /// Builds a mapper from an explicit schema.
    #[must_use]
    pub fn from_schema(schema: EntitySchema<T>) -> Self {
        let schema = resolve(schema);
        if let Err(err) = &schema {
            tracing::debug!(kind = T::kind(), error = %err, "entity schema rejected");
        }
        Self { schema }
    }

    /// Returns the cached schema check outcome.
    ///
    /// # Errors
    ///
    /// Returns the schema's [`MappingError`] if it is invalid.
    pub fn validate(&self) -> MappingResult<()> {
        self.resolved().map(|_| ())
    }

    fn resolved(&self) -> MappingResult<&Resolved<T>> {
        self.schema.as_ref().map_err(Clone::clone)
    }

    /// Returns the identity field's key.
    ///
    /// # Errors
    ///
    /// Returns the schema's [`MappingError`] if it is invalid.
    pub fn identity(&self, object: &T) -> MappingResult<Option<Key>> {
        Ok((self.resolved()?.identity.get)(object))
    }

    /// Writes `key` into the identity field.
    ///
    /// # Errors
    ///
    /// Returns the schema's [`MappingError`] if it is invalid.
    pub fn set_identity(&self, object: &mut T, key: Key) -> MappingResult<()> {
        (self.resolved()?.identity.set)(object, Some(key));
        Ok(())
    }

    /// Converts an entity into a record.
    ///
    /// The record key is the identity when set. Otherwise it is an incomplete
    /// key of `T::kind()`, below the parent when one is set.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] for an invalid schema, or a key error if the
    /// parent key is incomplete.
    pub fn to_record(&self, object: &T) -> CoreResult<Record> {
        let resolved = self.resolved()?;

        let key = match (resolved.identity.get)(object) {
            Some(key) => key,
            None => match resolved.parent.as_ref().and_then(|p| (p.get)(object)) {
                Some(parent) => parent.incomplete_child(T::kind())?,
                None => Key::incomplete(T::kind())?,
            },
        };

        let fields = resolved
            .properties
            .iter()
            .map(|p| (p.name.clone(), (p.get)(object)))
            .collect();
        Ok(Record::from_parts(key, fields))
    }

    /// Builds a new entity from a record.
    ///
    /// Properties missing from the record keep the factory's value; record
    /// fields the schema doesn't declare are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] for an invalid schema or a stored value of
    /// the wrong type.
    pub fn to_object(&self, record: &Record) -> MappingResult<T> {
        let resolved = self.resolved()?;

        let mut object = (resolved.factory)();
        (resolved.identity.set)(&mut object, Some(record.key().clone()));
        if let Some(parent) = &resolved.parent {
            (parent.set)(&mut object, record.key().parent());
        }

        for property in &resolved.properties {
            let Some(value) = record.get(&property.name) else {
                continue;
            };
            (property.set)(&mut object, value.clone()).map_err(|found| {
                MappingError::FieldType {
                    type_name: std::any::type_name::<T>(),
                    field: property.name.clone(),
                    expected: property.type_name,
                    found: found.type_name(),
                }
            })?;
        }

        Ok(object)
    }

    /// Converts a batch of records, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that cannot be mapped.
    pub fn records_to_objects(&self, records: Vec<Record>) -> MappingResult<Vec<T>> {
        records.iter().map(|r| self.to_object(r)).collect()
    }
}

impl<T: Entity> Default for EntityMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> std::fmt::Debug for EntityMapper<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityMapper")
            .field("kind", &T::kind())
            .field("valid", &self.schema.is_ok())
            .finish()
    }
}

/// Checks a schema. The identity count is checked first and the factory last.
fn resolve<T: 'static>(schema: EntitySchema<T>) -> MappingResult<Resolved<T>> {
    let type_name = std::any::type_name::<T>();

    let mut seen = HashSet::new();
    for name in schema.field_names() {
        if !seen.insert(name) {
            return Err(duplicate(type_name, name, &schema));
        }
    }

    let EntitySchema {
        mut identities,
        mut parents,
        properties,
        factory,
    } = schema;

    let identity = match identities.len() {
        0 => return Err(MappingError::NoIdentityField { type_name }),
        1 => identities.remove(0),
        _ => {
            return Err(MappingError::MultipleIdentityFields {
                type_name,
                fields: identities.into_iter().map(|f| f.name).collect(),
            })
        }
    };
    if parents.len() > 1 {
        return Err(MappingError::MultipleParentFields {
            type_name,
            fields: parents.into_iter().map(|f| f.name).collect(),
        });
    }
    let factory = factory.ok_or(MappingError::NotInstantiable { type_name })?;

    Ok(Resolved {
        identity,
        parent: parents.pop(),
        properties,
        factory,
    })
}

/// Duplicate names are reported after identity and parent counts, which
/// take precedence.
fn duplicate<T>(type_name: &'static str, field: &str, schema: &EntitySchema<T>) -> MappingError {
    match (schema.identities.len(), schema.parents.len()) {
        (0, _) => MappingError::NoIdentityField { type_name },
        (n, _) if n > 1 => MappingError::MultipleIdentityFields {
            type_name,
            fields: schema.identities.iter().map(|f| f.name.clone()).collect(),
        },
        (_, n) if n > 1 => MappingError::MultipleParentFields {
            type_name,
            fields: schema.parents.iter().map(|f| f.name.clone()).collect(),
        },
        _ => MappingError::DuplicateField {
            type_name,
            field: field.to_string(),
        },
    }
}
