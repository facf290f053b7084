//! Benchmark utilities.

use jabcom_codec::{Key, KeyId, Record, Value};
use std::collections::BTreeMap;

/// Builds a record with `fields` text fields of `size` bytes each.
pub fn sample_record(key: Key, fields: usize, size: usize) -> Record {
    let fields: BTreeMap<String, Value> = (0..fields)
        .map(|i| (format!("field_{i}"), Value::Text("x".repeat(size))))
        .collect();
    Record::from_parts(key, fields)
}

/// Builds a key `depth` levels deep, mixing numeric and named ids.
pub fn deep_key(depth: usize) -> Key {
    let mut key = Key::from_name("Root", "root").expect("valid root key");
    for level in 1..depth {
        let id = if level % 2 == 0 {
            KeyId::Id(level as u64)
        } else {
            KeyId::Name(format!("level/{level}"))
        };
        key = key.child(format!("Level{level}"), id).expect("valid child key");
    }
    key
}
