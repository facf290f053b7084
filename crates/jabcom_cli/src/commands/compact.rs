//! Compact command implementation.

use super::open_store;
use crate::error::CliResult;
use crate::output::{format_size, Format};
use jabcom_core::Datastore;
use jabcom_storage::CompactStats;
use serde::Serialize;
use std::path::Path;

/// Compaction report.
#[derive(Debug, Default, Serialize)]
pub struct CompactReport {
    /// Live records written to the new log.
    pub records: usize,
    /// Bytes before compaction.
    pub bytes_before: u64,
    /// Bytes after compaction.
    pub bytes_after: u64,
}

impl CompactReport {
    /// Bytes reclaimed.
    pub fn saved(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Runs the compact command.
pub fn run(path: &Path, format: Format) -> CliResult<()> {
    let datastore = open_store(path)?;
    let report = compact(&datastore)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Text => {
            println!("Compacted {}", path.display());
            println!("  Live records: {}", report.records);
            println!("  Size before:  {}", format_size(report.bytes_before));
            println!("  Size after:   {}", format_size(report.bytes_after));
            println!(
                "  Space saved:  {} ({:.1}%)",
                format_size(report.saved()),
                if report.bytes_before > 0 {
                    (report.saved() as f64 / report.bytes_before as f64) * 100.0
                } else {
                    0.0
                }
            );
        }
    }
    Ok(())
}

fn compact(datastore: &Datastore) -> CliResult<CompactReport> {
    Ok(datastore.compact()?.map(CompactReport::from).unwrap_or_default())
}

impl From<CompactStats> for CompactReport {
    fn from(stats: CompactStats) -> Self {
        Self {
            records: stats.records,
            bytes_before: stats.bytes_before,
            bytes_after: stats.bytes_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jabcom_codec::{Key, Record};
    use jabcom_core::Config;
    use jabcom_storage::StorageBackend;
    use tempfile::tempdir;

    #[test]
    fn compaction_drops_dead_entries() {
        let dir = tempdir().unwrap();
        {
            let datastore = Datastore::open(dir.path(), Config::default()).unwrap();
            let backend = datastore.backend();
            let key = Key::from_name("Note", "n").unwrap();
            for i in 0..5i64 {
                backend.put(Record::new(key.clone()).with("v", i)).unwrap();
            }
            backend
                .put(Record::new(Key::incomplete("Note").unwrap()))
                .unwrap();
        }

        let datastore = open_store(dir.path()).unwrap();
        let report = compact(&datastore).unwrap();
        assert_eq!(report.records, 2);
        assert!(report.bytes_after < report.bytes_before);
        assert_eq!(report.saved(), report.bytes_before - report.bytes_after);
    }

    #[test]
    fn missing_store_is_not_created() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(open_store(&missing).is_err());
        assert!(!missing.exists());
    }
}
