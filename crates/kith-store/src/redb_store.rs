use crate::error::StorageError;
use crate::kv::{KvPatch, KvRead, KvStore};
use parking_lot::RwLock;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};

// Single table; upper layers multiplex by key prefix.
const DATA_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("data");

/// Key-value store in a single redb file.
///
/// redb holds an exclusive lock on the file, so a second open of the same
/// path fails instead of corrupting the index.
pub struct RedbStore {
    db: RwLock<Option<Database>>,
    path: PathBuf,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)?;
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(DATA_TABLE)?;
        }
        write_txn.commit()?;
        tracing::debug!(path = %path.display(), "opened redb store");
        Ok(Self {
            db: RwLock::new(Some(db)),
            path,
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvRead for RedbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::Closed)?;
        let txn = db.begin_read()?;
        let table = txn.open_table(DATA_TABLE)?;
        let val = table.get(key)?.map(|v| v.value().to_vec());
        Ok(val)
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::Closed)?;
        let txn = db.begin_read()?;
        let table = txn.open_table(DATA_TABLE)?;
        let mut result = Vec::new();
        for entry in table.range(prefix..)? {
            let (k, v) = entry?;
            let k_bytes = k.value();
            if !k_bytes.starts_with(prefix) {
                break;
            }
            result.push((k_bytes.to_vec(), v.value().to_vec()));
        }
        Ok(result)
    }
}

impl KvStore for RedbStore {
    fn apply(&self, patch: KvPatch) -> Result<(), StorageError> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(StorageError::Closed)?;
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DATA_TABLE)?;
            for (key, val) in &patch.puts {
                table.insert(key.as_slice(), val.as_slice())?;
            }
            for key in &patch.deletes {
                table.remove(key.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        if self.db.write().take().is_some() {
            tracing::debug!(path = %self.path.display(), "closed redb store");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_scan_stops_at_prefix_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("kv.redb")).unwrap();

        let mut patch = KvPatch::new();
        patch
            .put(b"a/1".to_vec(), b"one".to_vec())
            .put(b"a/2".to_vec(), b"two".to_vec())
            .put(b"b/1".to_vec(), b"other".to_vec());
        store.apply(patch).unwrap();

        let pairs = store.scan(b"a/").unwrap();
        assert_eq!(
            pairs,
            vec![
                (b"a/1".to_vec(), b"one".to_vec()),
                (b"a/2".to_vec(), b"two".to_vec()),
            ]
        );
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set(b"key", b"value").unwrap();
            store.close().unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_patch_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("kv.redb")).unwrap();
        store.set(b"gone", b"1").unwrap();

        let mut patch = KvPatch::new();
        patch.delete(b"gone".to_vec()).put(b"kept".to_vec(), b"2".to_vec());
        store.apply(patch).unwrap();

        assert_eq!(store.get(b"gone").unwrap(), None);
        assert_eq!(store.get(b"kept").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_closed_store_rejects_access() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("kv.redb")).unwrap();
        store.close().unwrap();

        assert_matches!(store.get(b"key"), Err(StorageError::Closed));
        assert_matches!(store.set(b"key", b"v"), Err(StorageError::Closed));
    }

    #[test]
    fn test_second_open_of_same_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kv.redb");
        let _first = RedbStore::open(&path).unwrap();

        assert_matches!(RedbStore::open(&path), Err(StorageError::Database(_)));
    }
}
