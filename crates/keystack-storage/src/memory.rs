//! In-memory stack store.

use crate::{Changeset, ElementStore, LengthTable, StackStore, StorageError};
use keystack_types::{Felt, Identification, SlotKey};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process-local backend. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    elements: RwLock<HashMap<SlotKey, Felt>>,
    lengths: RwLock<HashMap<Identification, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifications that have a length entry.
    pub fn instance_count(&self) -> usize {
        self.lengths.read().len()
    }

    /// Number of element slots ever written, live or stale.
    pub fn slot_count(&self) -> usize {
        self.elements.read().len()
    }
}

impl ElementStore for MemoryStore {
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError> {
        let elements = self.elements.read();
        Ok(elements
            .get(&SlotKey::new(identification, index))
            .copied()
            .unwrap_or(Felt::ZERO))
    }

    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError> {
        self.elements
            .write()
            .insert(SlotKey::new(identification, index), value);
        Ok(())
    }
}

impl LengthTable for MemoryStore {
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError> {
        Ok(self.lengths.read().get(&identification).copied().unwrap_or(0))
    }

    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError> {
        self.lengths.write().insert(identification, length);
        Ok(())
    }
}

impl StackStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn apply(&self, changes: Changeset) -> Result<(), StorageError> {
        let mut elements = self.elements.write();
        let mut lengths = self.lengths.write();
        elements.extend(changes.elements().iter().copied());
        lengths.extend(changes.lengths().iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();
        let id = Identification::new(9);

        assert_eq!(store.get_length(id).unwrap(), 0);
        assert_eq!(store.get(id, 0).unwrap(), Felt::ZERO);
        assert_eq!(store.get(id, 1_000).unwrap(), Felt::ZERO);
    }

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        let id = Identification::new(1);

        store.set(id, 0, Felt::new(42)).unwrap();
        store.set(id, 0, Felt::new(43)).unwrap();
        store.set_length(id, 1).unwrap();

        assert_eq!(store.get(id, 0).unwrap(), Felt::new(43));
        assert_eq!(store.get_length(id).unwrap(), 1);
        assert_eq!(store.slot_count(), 1);
        assert_eq!(store.instance_count(), 1);
    }

    #[test]
    fn test_identifications_are_isolated() {
        let store = MemoryStore::new();
        let a = Identification::new(1);
        let b = Identification::new(2);

        store.set(a, 0, Felt::new(1)).unwrap();
        store.set_length(a, 1).unwrap();

        assert_eq!(store.get(b, 0).unwrap(), Felt::ZERO);
        assert_eq!(store.get_length(b).unwrap(), 0);
    }

    #[test]
    fn test_apply_changeset() {
        let store = MemoryStore::new();
        let id = Identification::new(6);

        let mut changes = Changeset::new();
        changes.set_element(id, 0, Felt::new(8));
        changes.set_element(id, 1, Felt::new(9));
        changes.set_length(id, 2);
        store.apply(changes).unwrap();

        assert_eq!(store.get(id, 1).unwrap(), Felt::new(9));
        assert_eq!(store.get_length(id).unwrap(), 2);
        assert_eq!(store.slot_count(), 2);
    }
}
