//! Per-identification locks.
//!
//! Operations on one identification run one at a time. Operations on
//! different identifications never share a lock. Entries are dropped from
//! the table once nobody holds or waits on them.

use dashmap::DashMap;
use keystack_types::Identification;
use parking_lot::Mutex;
use std::sync::Arc;

/// Table of per-identification mutexes.
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<Identification, Arc<Mutex<()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock of `identification`.
    pub fn with_lock<R>(&self, identification: Identification, f: impl FnOnce() -> R) -> R {
        let lock = self
            .locks
            .entry(identification)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock();
            f()
        };

        drop(lock);
        // Only the table's own reference left: nobody holds or waits on it
        self.locks
            .remove_if(&identification, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    /// Number of identifications currently holding a table entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
