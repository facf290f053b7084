//! Dump command implementation.

use super::open_store;
use crate::error::CliResult;
use crate::output::{record_to_json, record_to_text, Format};
use jabcom_codec::{decode_key, Record};
use jabcom_storage::StorageBackend;
use std::path::Path;

/// Which records to print.
#[derive(Debug, Default, Clone)]
pub struct Filter {
    /// Only records of this kind.
    pub kind: Option<String>,
    /// Only records below this key, in string form. Needs `kind`.
    pub ancestor: Option<String>,
    /// Maximum number of records.
    pub limit: Option<usize>,
}

/// Runs the dump command.
pub fn run(path: &Path, filter: &Filter, format: Format) -> CliResult<()> {
    let datastore = open_store(path)?;
    let records = select(datastore.backend().as_ref(), filter)?;

    match format {
        Format::Json => {
            let json: Vec<_> = records.iter().map(record_to_json).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Format::Text => {
            for record in &records {
                println!("{}", record_to_text(record));
            }
            println!();
            println!("{} record(s)", records.len());
        }
    }
    Ok(())
}

/// Loads the records matching `filter`, in insertion order.
pub fn select(backend: &dyn StorageBackend, filter: &Filter) -> CliResult<Vec<Record>> {
    let mut records = match (&filter.kind, &filter.ancestor) {
        (Some(kind), Some(ancestor)) => backend.query_by_ancestor(&decode_key(ancestor)?, kind)?,
        (Some(kind), None) => backend.scan_kind(kind)?,
        (None, _) => backend.scan_all()?,
    };
    if let Some(limit) = filter.limit {
        records.truncate(limit);
    }
    tracing::debug!(count = records.len(), "selected records");
    Ok(records)
}
