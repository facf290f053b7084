//! Key command implementation.

use crate::error::CliResult;
use crate::output::Format;
use jabcom_codec::{decode_key, Key, KeyId};
use serde::Serialize;

/// Parsed form of a key string.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    /// Canonical string form.
    pub canonical: String,
    /// Leaf kind.
    pub kind: String,
    /// Leaf id, if the key is complete.
    pub id: Option<IdInfo>,
    /// Whether the key has a leaf id.
    pub complete: bool,
    /// Parent key in string form.
    pub parent: Option<String>,
    /// Path elements from the root, as `(kind, id)` strings.
    pub path: Vec<String>,
}

/// A leaf id.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdInfo {
    /// Numeric id.
    Id(u64),
    /// Name.
    Name(String),
}

impl KeyInfo {
    /// Describes `key`.
    pub fn of(key: &Key) -> Self {
        let mut path: Vec<String> = key
            .ancestors()
            .iter()
            .map(|e| format!("{} {}", e.kind(), e.id()))
            .collect();
        let id = key.id().map(|id| match id {
            KeyId::Id(n) => IdInfo::Id(*n),
            KeyId::Name(name) => IdInfo::Name(name.clone()),
        });
        path.push(match key.id() {
            Some(id) => format!("{} {}", key.kind(), id),
            None => format!("{} <incomplete>", key.kind()),
        });

        Self {
            canonical: key.to_string(),
            kind: key.kind().to_string(),
            id,
            complete: key.is_complete(),
            parent: key.parent().map(|p| p.to_string()),
            path,
        }
    }
}

/// Runs the key command.
pub fn run(input: &str, format: Format) -> CliResult<()> {
    let info = KeyInfo::of(&decode_key(input)?);
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        Format::Text => {
            println!("Key:      {}", info.canonical);
            println!("Kind:     {}", info.kind);
            println!("Complete: {}", info.complete);
            if let Some(parent) = &info.parent {
                println!("Parent:   {parent}");
            }
            println!("Path:");
            for (depth, element) in info.path.iter().enumerate() {
                println!("  {depth}: {element}");
            }
        }
    }
    Ok(())
}
