//! Text and JSON rendering of records.

use jabcom_codec::{Record, Value};
use serde_json::{json, Map};
use std::fmt::Write as _;

/// Output format of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Converts a value to JSON. Keys become their string form and byte
/// strings become lower-case hex.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Integer(i) => json!(i),
        Value::Bytes(bytes) => json!({ "bytes": hex(bytes) }),
        Value::Text(text) => json!(text),
        Value::Key(key) => json!({ "key": key.to_string() }),
        Value::Array(items) => items.iter().map(value_to_json).collect(),
        Value::Map(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect::<Map<_, _>>()
            .into(),
    }
}

/// Converts a record to a JSON object with `key` and `fields`.
pub fn record_to_json(record: &Record) -> serde_json::Value {
    let fields: Map<String, serde_json::Value> = record
        .fields()
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect();
    json!({
        "key": record.key().to_string(),
        "fields": fields,
    })
}

/// Renders a value on one line.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Bytes(bytes) => format!("h'{}'", hex(bytes)),
        Value::Text(text) => format!("{text:?}"),
        Value::Key(key) => format!("<{key}>"),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(value_to_text).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}: {}", value_to_text(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

/// Renders a record as `key` followed by one indented line per field.
pub fn record_to_text(record: &Record) -> String {
    let mut out = record.key().to_string();
    for (name, value) in record.fields() {
        let _ = write!(out, "\n  {name} = {}", value_to_text(value));
    }
    out
}

/// Formats a byte count for humans.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
