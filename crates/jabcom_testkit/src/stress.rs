//! Stress helpers for Jabcom.
//!
//! These helpers hammer a datastore from several threads and report what
//! came back, so tests can check that auto-assigned ids stay unique.

use crate::fixtures::{TestChildObject, TestParentObject};
use jabcom_codec::Key;
use jabcom_core::{Dao, Datastore};
use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Keys returned by successful saves, in no particular order.
    pub keys: Vec<Key>,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Returns the number of successful saves.
    pub fn successful_ops(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of distinct keys handed out.
    pub fn distinct_keys(&self) -> usize {
        self.keys.iter().collect::<HashSet<_>>().len()
    }

    /// Returns true if every successful save got its own key.
    pub fn all_keys_distinct(&self) -> bool {
        self.distinct_keys() == self.keys.len()
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        let total = self.keys.len() + self.failed_ops;
        if self.duration.as_secs_f64() > 0.0 {
            total as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent threads.
    pub threads: usize,
    /// Saves performed by each thread.
    pub saves_per_thread: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            saves_per_thread: 50,
        }
    }
}

/// Saves new root parents from several threads at once.
pub fn stress_concurrent_saves(datastore: &Datastore, config: &StressConfig) -> StressTestResult {
    run_concurrent(config, |thread, i| {
        let mut parent = TestParentObject::named(format!("t{thread}-{i}"));
        datastore.dao::<TestParentObject>().save(&mut parent).ok()
    })
}

/// Saves new children below one parent from several threads at once.
pub fn stress_concurrent_child_saves(
    datastore: &Datastore,
    parent: &Key,
    config: &StressConfig,
) -> StressTestResult {
    run_concurrent(config, |thread, i| {
        let mut child = TestChildObject::below(parent, format!("t{thread}-{i}"));
        datastore.dao::<TestChildObject>().save(&mut child).ok()
    })
}

fn run_concurrent<F>(config: &StressConfig, save: F) -> StressTestResult
where
    F: Fn(usize, usize) -> Option<Key> + Sync,
{
    let start = Instant::now();
    let per_thread: Vec<Vec<Option<Key>>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.threads)
            .map(|t| {
                let save = &save;
                scope.spawn(move || (0..config.saves_per_thread).map(|i| save(t, i)).collect())
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("Stress thread panicked"))
            .collect()
    });

    let mut keys = Vec::new();
    let mut failed_ops = 0;
    for key in per_thread.into_iter().flatten() {
        match key {
            Some(key) => keys.push(key),
            None => failed_ops += 1,
        }
    }

    StressTestResult {
        keys,
        failed_ops,
        duration: start.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDatastore;

    #[test]
    fn concurrent_root_saves_get_distinct_keys() {
        let test_store = TestDatastore::memory();
        let config = StressConfig {
            threads: 4,
            saves_per_thread: 20,
        };

        let result = stress_concurrent_saves(&test_store, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops(), 80);
        assert!(result.all_keys_distinct());
    }

    #[test]
    fn stopped_backend_counts_failures() {
        let test_store = TestDatastore::memory();
        test_store.memory_backend().unwrap().stop();

        let result = stress_concurrent_saves(
            &test_store,
            &StressConfig {
                threads: 2,
                saves_per_thread: 3,
            },
        );
        assert_eq!(result.successful_ops(), 0);
        assert_eq!(result.failed_ops, 6);
    }
}
