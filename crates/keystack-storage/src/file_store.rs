//! File store - Durable stack store on top of the JSON column `Database`.
//!
//! Element keys are `SlotKey` bytes, length keys are the identification's
//! little-endian bytes. Values are borsh-encoded.

use crate::db::{Column, Database, WriteBatch};
use crate::{Changeset, ElementStore, LengthTable, StackStore, StorageError};
use keystack_types::{Felt, Identification, SlotKey};
use std::path::Path;

/// Stack store persisted under a data directory.
pub struct FileStore {
    db: Database,
}

impl FileStore {
    /// Open the store in `path`, restoring any stacks written before.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let db = Database::new(path)?;
        let store = Self { db };
        tracing::info!(
            path = %path.display(),
            instances = store.instance_count(),
            slots = store.db.len(Column::Elements),
            "Opened file stack store"
        );
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Number of identifications that have a length entry.
    pub fn instance_count(&self) -> usize {
        self.db.len(Column::Lengths)
    }
}

fn decode<T: borsh::BorshDeserialize>(bytes: &[u8]) -> Result<T, StorageError> {
    borsh::from_slice(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}

fn encode<T: borsh::BorshSerialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    borsh::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

impl ElementStore for FileStore {
    fn get(&self, identification: Identification, index: u64) -> Result<Felt, StorageError> {
        let key = SlotKey::new(identification, index).to_bytes();
        match self.db.get(Column::Elements, &key)? {
            Some(bytes) => decode(&bytes),
            None => Ok(Felt::ZERO),
        }
    }

    fn set(&self, identification: Identification, index: u64, value: Felt) -> Result<(), StorageError> {
        let key = SlotKey::new(identification, index).to_bytes();
        self.db.put(Column::Elements, &key, &encode(&value)?)
    }
}

impl LengthTable for FileStore {
    fn get_length(&self, identification: Identification) -> Result<u64, StorageError> {
        match self.db.get(Column::Lengths, &identification.to_le_bytes())? {
            Some(bytes) => decode(&bytes),
            None => Ok(0),
        }
    }

    fn set_length(&self, identification: Identification, length: u64) -> Result<(), StorageError> {
        self.db
            .put(Column::Lengths, &identification.to_le_bytes(), &encode(&length)?)
    }
}

impl StackStore for FileStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    /// Elements and lengths go out in one rewrite of the data file.
    fn apply(&self, changes: Changeset) -> Result<(), StorageError> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::new();
        for (slot, value) in changes.elements() {
            batch.put(Column::Elements, &slot.to_bytes(), &encode(value)?);
        }
        for (identification, length) in changes.lengths() {
            batch.put(Column::Lengths, &identification.to_le_bytes(), &encode(length)?);
        }
        self.db.batch_write(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let id = Identification::new(4);

        assert_eq!(store.get_length(id).unwrap(), 0);
        assert_eq!(store.get(id, 0).unwrap(), Felt::ZERO);
        assert_eq!(store.backend(), "file");
    }

    #[test]
    fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let id = Identification::new(2);

        {
            let store = FileStore::open(temp_dir.path()).unwrap();
            store.set(id, 0, Felt::new(52)).unwrap();
            store.set(id, 1, Felt::new(-42)).unwrap();
            store.set_length(id, 2).unwrap();
        }

        let store = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(store.get_length(id).unwrap(), 2);
        assert_eq!(store.get(id, 0).unwrap(), Felt::new(52));
        assert_eq!(store.get(id, 1).unwrap(), Felt::new(-42));
        assert_eq!(store.instance_count(), 1);
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let id = Identification::new(9);

        let mut changes = Changeset::new();
        changes.set_element(id, 0, Felt::new(3));
        changes.set_length(id, 1);
        store.apply(changes.clone()).unwrap();
        assert_eq!(store.get_length(id).unwrap(), 1);

        // A directory where the temp file goes makes the rewrite fail
        let tmp = temp_dir.path().join(crate::db::TMP_FILE);
        std::fs::create_dir(&tmp).unwrap();

        let mut next = Changeset::new();
        next.set_element(id, 1, Felt::new(4));
        next.set_length(id, 2);
        assert!(matches!(store.apply(next), Err(StorageError::Io(_))));
        assert_eq!(store.get_length(id).unwrap(), 1);
        assert_eq!(store.get(id, 1).unwrap(), Felt::ZERO);

        std::fs::remove_dir(&tmp).unwrap();
        let reopened = FileStore::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.get_length(id).unwrap(), 1);
        assert_eq!(reopened.get(id, 0).unwrap(), Felt::new(3));
    }

    #[test]
    fn test_corrupt_value_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        let id = Identification::new(1);

        store
            .db
            .put(Column::Lengths, &id.to_le_bytes(), &[1, 2, 3])
            .unwrap();

        assert!(matches!(
            store.get_length(id),
            Err(StorageError::Deserialization(_))
        ));
    }
}
