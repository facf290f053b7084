//! Error types for Jabcom core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for entity mapping.
pub type MappingResult<T> = Result<T, MappingError>;

/// Errors raised when a type cannot be mapped to records.
///
/// Schema problems are detected once per mapper and the same error is
/// returned by every later operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The schema declares no identity field.
    #[error("{type_name} has no identity field")]
    NoIdentityField {
        /// Rust type name of the entity.
        type_name: &'static str,
    },

    /// The schema declares more than one identity field.
    #[error("{type_name} has multiple identity fields: {fields:?}")]
    MultipleIdentityFields {
        /// Rust type name of the entity.
        type_name: &'static str,
        /// Names of the identity fields.
        fields: Vec<String>,
    },

    /// The schema declares more than one parent field.
    #[error("{type_name} has multiple parent fields: {fields:?}")]
    MultipleParentFields {
        /// Rust type name of the entity.
        type_name: &'static str,
        /// Names of the parent fields.
        fields: Vec<String>,
    },

    /// Two fields share a name.
    #[error("{type_name} declares field {field:?} more than once")]
    DuplicateField {
        /// Rust type name of the entity.
        type_name: &'static str,
        /// The repeated field name.
        field: String,
    },

    /// The schema has no factory, so instances cannot be created.
    #[error("{type_name} cannot be instantiated: no factory registered")]
    NotInstantiable {
        /// Rust type name of the entity.
        type_name: &'static str,
    },

    /// A stored value does not fit the field's type.
    #[error("field {field:?} of {type_name} expects {expected}, found {found}")]
    FieldType {
        /// Rust type name of the entity.
        type_name: &'static str,
        /// Field name.
        field: String,
        /// Expected value type.
        expected: &'static str,
        /// Stored value type.
        found: &'static str,
    },
}

/// Errors that can occur in Jabcom core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entity type cannot be mapped.
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// A key is malformed or invalid.
    #[error("key error: {0}")]
    Key(#[from] jabcom_codec::KeyError),

    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] jabcom_storage::StorageError),
}

impl CoreError {
    /// Returns the mapping error, if this is one.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&MappingError> {
        match self {
            Self::Mapping(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the backend was unavailable.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Storage(jabcom_storage::StorageError::Unavailable)
        )
    }
}
