//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random keys, values and records that
//! satisfy the key invariants (non-empty kinds and names, ids above zero).

use jabcom_codec::{Key, KeyId, PathElement, Record, Value};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// Strategy for generating kinds, including characters the key codec has
/// to escape.
pub fn kind_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Z][a-zA-Z0-9_]{0,11}",
        1 => "[a-z/:'%\u{1}é ]{1,8}",
    ]
}

/// Strategy for generating valid key ids.
pub fn key_id_strategy() -> impl Strategy<Value = KeyId> {
    prop_oneof![
        (1u64..=u64::MAX).prop_map(KeyId::Id),
        "[a-z0-9/:'% -]{1,12}".prop_map(KeyId::Name),
    ]
}

/// Strategy for generating valid path elements.
pub fn path_element_strategy() -> impl Strategy<Value = PathElement> {
    (kind_strategy(), key_id_strategy())
        .prop_map(|(kind, id)| PathElement::new(kind, id).expect("Generated element is valid"))
}

/// Strategy for generating complete keys with up to `max_depth` ancestors.
pub fn complete_key_strategy(max_depth: usize) -> impl Strategy<Value = Key> {
    prop::collection::vec(path_element_strategy(), 1..=max_depth + 1)
        .prop_map(|path| Key::from_path(path).expect("Generated path is not empty"))
}

/// Strategy for generating complete and incomplete keys.
pub fn key_strategy() -> impl Strategy<Value = Key> {
    prop_oneof![
        3 => complete_key_strategy(3),
        1 => (prop::option::of(complete_key_strategy(2)), kind_strategy()).prop_map(
            |(parent, kind)| match parent {
                Some(parent) => parent
                    .incomplete_child(kind)
                    .expect("Generated parent is complete"),
                None => Key::incomplete(kind).expect("Generated kind is valid"),
            }
        ),
    ]
}

/// Strategy for generating scalar values.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
        ".{0,16}".prop_map(Value::Text),
        complete_key_strategy(1).prop_map(Value::Key),
    ]
}

/// Strategy for generating values with nested arrays and maps.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

/// Strategy for generating record fields.
pub fn fields_strategy() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map("[a-zA-Z_][a-zA-Z0-9_]{0,9}", value_strategy(), 0..6)
}

/// Strategy for generating records with complete keys.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    (complete_key_strategy(2), fields_strategy())
        .prop_map(|(key, fields)| Record::from_parts(key, fields))
}

/// An operation applied to a backend in model-based tests.
#[derive(Debug, Clone)]
pub enum RecordOperation {
    /// Put a record under a named key.
    PutNamed {
        /// Key name, from a small pool so that puts overwrite.
        name: String,
        /// Record fields.
        fields: BTreeMap<String, Value>,
    },
    /// Put a record under an incomplete key.
    PutAuto {
        /// Record fields.
        fields: BTreeMap<String, Value>,
    },
    /// Remove the record under a named key.
    Remove {
        /// Key name.
        name: String,
    },
}

/// Strategy for generating record operations.
pub fn record_operation_strategy() -> impl Strategy<Value = RecordOperation> {
    let name = "[a-d]";
    let fields = || prop::collection::btree_map("[a-c]", scalar_value_strategy(), 0..3);
    prop_oneof![
        3 => (name, fields())
            .prop_map(|(name, fields)| RecordOperation::PutNamed { name, fields }),
        2 => fields().prop_map(|fields| RecordOperation::PutAuto { fields }),
        1 => name.prop_map(|name| RecordOperation::Remove { name }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<RecordOperation>> {
    prop::collection::vec(record_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn complete_keys_are_complete(key in complete_key_strategy(3)) {
            prop_assert!(key.is_complete());
            prop_assert!(key.ancestors().len() <= 3);
        }

        #[test]
        fn incomplete_keys_have_complete_parents(key in key_strategy()) {
            if let Some(parent) = key.parent() {
                prop_assert!(parent.is_complete());
            }
        }

        #[test]
        fn records_have_complete_keys(record in record_strategy()) {
            prop_assert!(record.key().is_complete());
        }
    }
}
