//! Ordered record table shared by the backends.

use crate::error::{StorageError, StorageResult};
use jabcom_codec::{Key, KeyId, Record};
use std::collections::{BTreeMap, HashMap};

/// Records indexed by key, plus insertion order and per-scope id allocation.
///
/// The table itself is not synchronised; backends wrap it in a lock.
#[derive(Debug, Default)]
pub(crate) struct RecordTable {
    records: HashMap<Key, Slot>,
    order: BTreeMap<u64, Key>,
    next_seq: u64,
    /// Highest id known to be taken, per `(parent, kind)` scope.
    allocated: BTreeMap<Key, u64>,
}

#[derive(Debug)]
struct Slot {
    seq: u64,
    record: Record,
}

impl RecordTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, key: &Key) -> Option<&Record> {
        self.records.get(key).map(|slot| &slot.record)
    }

    /// Returns the key a record will be stored under, allocating an id for
    /// incomplete keys.
    ///
    /// An allocated id is consumed even if the caller never inserts the record.
    pub(crate) fn complete_key(&mut self, key: &Key) -> StorageResult<Key> {
        if key.is_complete() {
            return Ok(key.clone());
        }
        let scope = key.scope();
        let last = self.allocated.get(&scope).copied().unwrap_or(0);
        let id = last
            .checked_add(1)
            .ok_or_else(|| StorageError::IdsExhausted {
                scope: scope.to_string(),
            })?;
        self.allocated.insert(scope, id);
        Ok(key.with_id(KeyId::Id(id))?)
    }

    /// Marks `id` as taken in `scope`.
    pub(crate) fn reserve(&mut self, scope: Key, id: u64) {
        let last = self.allocated.entry(scope).or_insert(0);
        *last = (*last).max(id);
    }

    /// Inserts a record under its (complete) key.
    ///
    /// Replacing an existing record keeps its insertion position.
    pub(crate) fn insert(&mut self, record: Record) {
        if let Some(KeyId::Id(id)) = record.key().id() {
            self.reserve(record.key().scope(), *id);
        }
        let key = record.key().clone();
        match self.records.get_mut(&key) {
            Some(slot) => slot.record = record,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.order.insert(seq, key.clone());
                self.records.insert(key, Slot { seq, record });
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &Key) -> bool {
        match self.records.remove(key) {
            Some(slot) => {
                self.order.remove(&slot.seq);
                true
            }
            None => false,
        }
    }

    /// Iterates records in insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Record> {
        self.order
            .values()
            .filter_map(|key| self.records.get(key).map(|slot| &slot.record))
    }

    /// Iterates `(scope, highest taken id)` pairs.
    pub(crate) fn allocations(&self) -> impl Iterator<Item = (&Key, u64)> {
        self.allocated.iter().map(|(scope, last)| (scope, *last))
    }

    pub(crate) fn query_by_ancestor(&self, ancestor: &Key, kind: &str) -> Vec<Record> {
        self.iter()
            .filter(|record| record.key().kind() == kind && ancestor.is_ancestor_of(record.key()))
            .cloned()
            .collect()
    }

    pub(crate) fn scan_kind(&self, kind: &str) -> Vec<Record> {
        self.iter()
            .filter(|record| record.key().kind() == kind)
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Drops every record. Id allocations survive so ids are not reused.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }
}
