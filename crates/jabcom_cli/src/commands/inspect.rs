//! Inspect command implementation.

use super::open_store;
use crate::error::CliResult;
use crate::output::{format_size, Format};
use jabcom_codec::Record;
use jabcom_storage::StorageBackend;
use serde::Serialize;
use std::path::Path;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Store path.
    pub path: String,
    /// Record log size in bytes.
    pub log_size: u64,
    /// Number of live records.
    pub record_count: usize,
    /// Number of records without a parent.
    pub root_count: usize,
    /// Per-kind statistics, in order of first appearance.
    pub kinds: Vec<KindStats>,
}

/// Statistics for a single kind.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct KindStats {
    /// Kind name.
    pub kind: String,
    /// Number of records.
    pub count: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: Format) -> CliResult<()> {
    let datastore = open_store(path)?;
    let records = datastore.backend().scan_all()?;

    let result = InspectResult {
        path: path.display().to_string(),
        log_size: datastore.log_size()?.unwrap_or(0),
        record_count: records.len(),
        root_count: records.iter().filter(|r| r.key().parent().is_none()).count(),
        kinds: kind_stats(&records),
    };

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        Format::Text => print_text_output(&result),
    }
    Ok(())
}

/// Counts records per kind, keeping the order in which kinds first appear.
pub fn kind_stats(records: &[Record]) -> Vec<KindStats> {
    let mut stats: Vec<KindStats> = Vec::new();
    for record in records {
        let kind = record.key().kind();
        match stats.iter_mut().find(|s| s.kind == kind) {
            Some(entry) => entry.count += 1,
            None => stats.push(KindStats {
                kind: kind.to_string(),
                count: 1,
            }),
        }
    }
    stats
}

fn print_text_output(result: &InspectResult) {
    println!("Jabcom Store Inspection");
    println!("=======================");
    println!();
    println!("Path: {}", result.path);
    println!("Log size: {}", format_size(result.log_size));
    println!();
    println!("Records:");
    println!("  Live records: {}", result.record_count);
    println!("  Root records: {}", result.root_count);

    if !result.kinds.is_empty() {
        println!();
        println!("Kinds:");
        for stats in &result.kinds {
            println!("  {:<24} {}", stats.kind, stats.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jabcom_codec::{Key, KeyId};

    #[test]
    fn kinds_in_first_appearance_order() {
        let parent = Key::from_name("Parent", "p").unwrap();
        let records = vec![
            Record::new(Key::from_id("Zeta", 1).unwrap()),
            Record::new(parent.clone()),
            Record::new(parent.child("Child", KeyId::Id(1)).unwrap()),
            Record::new(Key::from_id("Zeta", 2).unwrap()),
        ];

        assert_eq!(
            kind_stats(&records),
            vec![
                KindStats {
                    kind: "Zeta".into(),
                    count: 2
                },
                KindStats {
                    kind: "Parent".into(),
                    count: 1
                },
                KindStats {
                    kind: "Child".into(),
                    count: 1
                },
            ]
        );
    }
}
