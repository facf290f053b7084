//! Get command implementation.

use super::open_store;
use crate::error::CliResult;
use crate::output::{record_to_json, record_to_text, Format};
use jabcom_codec::decode_key;
use jabcom_storage::StorageBackend;
use std::path::Path;

/// Runs the get command. A missing record is reported, not an error.
pub fn run(path: &Path, key: &str, format: Format) -> CliResult<()> {
    let key = decode_key(key)?;
    let datastore = open_store(path)?;
    let record = datastore.backend().get(&key)?;

    match (format, record) {
        (Format::Json, Some(record)) => {
            println!("{}", serde_json::to_string_pretty(&record_to_json(&record))?);
        }
        (Format::Json, None) => println!("null"),
        (Format::Text, Some(record)) => println!("{}", record_to_text(&record)),
        (Format::Text, None) => println!("No record stored under {key}"),
    }
    Ok(())
}
