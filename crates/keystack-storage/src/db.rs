//! Database - JSON column file storage.
//!
//! The whole file is held in memory as a `serde_json::Value` with one
//! object per column. Keys and values are hex-encoded byte strings.
//! Every mutation rewrites `data.json` before returning, and a failed
//! rewrite leaves the in-memory view untouched.

use crate::error::StorageError;
use parking_lot::{Mutex, RwLock};
use std::fs;
use std::path::{Path, PathBuf};

const DATA_FILE: &str = "data.json";
pub(crate) const TMP_FILE: &str = "data.json.tmp";

/// Columns for organized data storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Element slots: SlotKey bytes → borsh(Felt)
    Elements,
    /// Stack lengths: identification bytes → borsh(u64)
    Lengths,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Column::Elements => "elements",
            Column::Lengths => "lengths",
        }
    }
}

/// Puts applied together by [`Database::batch_write`].
#[derive(Debug, Default)]
pub struct WriteBatch {
    puts: Vec<(Column, String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a value into the batch.
    pub fn put(&mut self, column: Column, key: &[u8], value: &[u8]) {
        self.puts.push((column, hex::encode(key), hex::encode(value)));
    }

    /// Get the batch size.
    pub fn len(&self) -> usize {
        self.puts.len()
    }

    /// Check if batch is empty.
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty()
    }
}

/// Database - JSON file-based column storage
pub struct Database {
    path: PathBuf,
    data: RwLock<serde_json::Value>,
    // One writer at a time: copy, persist, swap
    persist_lock: Mutex<()>,
}

impl Database {
    /// Open or create a database in the given directory.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(path)?;

        let data_file = path.join(DATA_FILE);
        let data = if data_file.exists() {
            let content = fs::read_to_string(&data_file)?;
            let value: serde_json::Value = serde_json::from_str(&content)
                .map_err(|e| StorageError::Deserialization(format!("{}: {}", data_file.display(), e)))?;
            if !value.is_object() {
                return Err(StorageError::Deserialization(format!(
                    "{}: expected a JSON object",
                    data_file.display()
                )));
            }
            value
        } else {
            serde_json::json!({})
        };

        Ok(Self {
            path: path.to_path_buf(),
            data: RwLock::new(data),
            persist_lock: Mutex::new(()),
        })
    }

    /// Directory holding the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, column: Column, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read();
        let key_hex = hex::encode(key);

        let value = data
            .get(column.name())
            .and_then(|entries| entries.get(&key_hex))
            .and_then(|value| value.as_str());

        match value {
            Some(value_hex) => Ok(Some(hex::decode(value_hex)?)),
            None => Ok(None),
        }
    }

    pub fn put(&self, column: Column, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let mut batch = WriteBatch::new();
        batch.put(column, key, value);
        self.batch_write(batch)
    }

    /// Apply every put in `batch` or none of them.
    ///
    /// The new document is built on a copy and only becomes visible to
    /// readers once `data.json` has been replaced on disk.
    pub fn batch_write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        if batch.is_empty() {
            return Ok(());
        }

        let _persist = self.persist_lock.lock();
        let mut next = self.data.read().clone();
        let root = next.as_object_mut().ok_or_else(|| {
            StorageError::Deserialization("database root is not an object".to_string())
        })?;
        for (column, key_hex, value_hex) in batch.puts {
            let entries = root
                .entry(column.name())
                .or_insert_with(|| serde_json::json!({}));
            let obj = entries.as_object_mut().ok_or_else(|| {
                StorageError::Deserialization(format!("column {} is not an object", column.name()))
            })?;
            obj.insert(key_hex, serde_json::Value::String(value_hex));
        }

        let snapshot = serde_json::to_vec_pretty(&next)?;
        self.persist(&snapshot)?;
        *self.data.write() = next;
        Ok(())
    }

    /// Number of keys in a column.
    pub fn len(&self, column: Column) -> usize {
        self.data
            .read()
            .get(column.name())
            .and_then(|e| e.as_object())
            .map(|e| e.len())
            .unwrap_or(0)
    }

    fn persist(&self, content: &[u8]) -> Result<(), StorageError> {
        // Write-then-rename so a crash never leaves a truncated data file
        let tmp_file = self.path.join(TMP_FILE);
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, self.path.join(DATA_FILE))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        assert!(temp_dir.path().exists());
        assert_eq!(db.path(), temp_dir.path());
        // data.json is only created when data is written
        assert!(!temp_dir.path().join(DATA_FILE).exists());
    }

    #[test]
    fn test_database_put_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        db.put(Column::Elements, b"key", b"value").unwrap();

        let retrieved = db.get(Column::Elements, b"key").unwrap();
        assert_eq!(retrieved, Some(b"value".to_vec()));
    }

    #[test]
    fn test_database_get_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        assert_eq!(db.get(Column::Lengths, b"missing").unwrap(), None);
    }

    #[test]
    fn test_batch_write() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(Column::Elements, b"key1", b"value1");
        batch.put(Column::Lengths, b"key2", b"value2");
        assert_eq!(batch.len(), 2);
        db.batch_write(batch).unwrap();

        let db = Database::new(temp_dir.path()).unwrap();
        assert_eq!(db.get(Column::Elements, b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(db.get(Column::Lengths, b"key2").unwrap(), Some(b"value2".to_vec()));
    }

    #[test]
    fn test_empty_batch_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        db.batch_write(WriteBatch::new()).unwrap();
        assert!(!temp_dir.path().join(DATA_FILE).exists());
    }

    #[test]
    fn test_failed_write_leaves_view_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();
        db.put(Column::Lengths, b"key", b"old").unwrap();

        // A directory where the temp file goes makes the rewrite fail
        fs::create_dir(temp_dir.path().join(TMP_FILE)).unwrap();

        let mut batch = WriteBatch::new();
        batch.put(Column::Lengths, b"key", b"new");
        batch.put(Column::Elements, b"slot", b"value");
        assert!(matches!(db.batch_write(batch), Err(StorageError::Io(_))));

        assert_eq!(db.get(Column::Lengths, b"key").unwrap(), Some(b"old".to_vec()));
        assert_eq!(db.get(Column::Elements, b"slot").unwrap(), None);
        assert_eq!(db.len(Column::Elements), 0);

        fs::remove_dir(temp_dir.path().join(TMP_FILE)).unwrap();
        db.put(Column::Lengths, b"key", b"new").unwrap();
        let reopened = Database::new(temp_dir.path()).unwrap();
        assert_eq!(reopened.get(Column::Lengths, b"key").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_database_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let db = Database::new(temp_dir.path()).unwrap();
            db.put(Column::Elements, b"key", b"value").unwrap();
        }

        // New instance loads from disk
        {
            let db = Database::new(temp_dir.path()).unwrap();
            assert_eq!(db.get(Column::Elements, b"key").unwrap(), Some(b"value".to_vec()));
        }
    }

    #[test]
    fn test_database_columns_are_separate() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        db.put(Column::Elements, b"key1", b"value1").unwrap();
        db.put(Column::Lengths, b"key2", b"value2").unwrap();

        assert_eq!(db.get(Column::Elements, b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(db.get(Column::Lengths, b"key2").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(db.get(Column::Elements, b"key2").unwrap(), None);
        assert_eq!(db.get(Column::Lengths, b"key1").unwrap(), None);
    }

    #[test]
    fn test_database_overwrite_value() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        db.put(Column::Elements, b"key", b"initial").unwrap();
        db.put(Column::Elements, b"key", b"new").unwrap();

        assert_eq!(db.get(Column::Elements, b"key").unwrap(), Some(b"new".to_vec()));
        assert_eq!(db.len(Column::Elements), 1);
    }

    #[test]
    fn test_database_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(DATA_FILE), "not json").unwrap();

        let result = Database::new(temp_dir.path());
        assert!(matches!(result, Err(StorageError::Deserialization(_))));
    }

    #[test]
    fn test_database_leaves_no_tmp_file() {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path()).unwrap();

        db.put(Column::Elements, b"key", b"value").unwrap();
        assert!(temp_dir.path().join(DATA_FILE).exists());
        assert!(!temp_dir.path().join(TMP_FILE).exists());
    }
}
