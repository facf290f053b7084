//! Backend-neutral record type.

use crate::key::Key;
use crate::value::Value;
use std::collections::BTreeMap;

/// A stored entity: its key plus named field values.
///
/// Records are the boundary format between the entity mapper and the
/// storage backends. Fields are ordered by name.
///
/// # Example
///
/// ```
/// use jabcom_codec::{Key, Record, Value};
///
/// let record = Record::new(Key::from_name("TestParentObject", "xyz").unwrap())
///     .with("propertyOne", 999)
///     .with("propertyTwo", "foo");
///
/// assert_eq!(record.get("propertyOne"), Some(&Value::Integer(999)));
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: Key,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a record without fields.
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            fields: BTreeMap::new(),
        }
    }

    /// Creates a record from a key and its fields.
    #[must_use]
    pub fn from_parts(key: Key, fields: BTreeMap<String, Value>) -> Self {
        Self { key, fields }
    }

    /// Sets a field and returns the record, for building records inline.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the key.
    #[must_use]
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Replaces the key, typically once the backend has assigned an id.
    pub fn set_key(&mut self, key: Key) {
        self.key = key;
    }

    /// Returns all fields.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Returns a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Splits the record into key and fields.
    #[must_use]
    pub fn into_parts(self) -> (Key, BTreeMap<String, Value>) {
        (self.key, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> Key {
        Key::from_id("Custody", 1).unwrap()
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut record = Record::new(key());
        assert_eq!(record.set("custodian", "Geoff"), None);
        assert_eq!(
            record.set("custodian", "Alex"),
            Some(Value::from("Geoff"))
        );
        assert_eq!(record.get("custodian"), Some(&Value::from("Alex")));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn fields_are_ordered_by_name() {
        let record = Record::new(key()).with("b", 2).with("a", 1).with("c", 3);
        let names: Vec<&str> = record.fields().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_and_into_parts() {
        let mut record = Record::new(key()).with("a", 1);
        assert_eq!(record.remove("a"), Some(Value::Integer(1)));
        assert!(record.is_empty());

        let (k, fields) = record.into_parts();
        assert_eq!(k, key());
        assert!(fields.is_empty());
    }
}
