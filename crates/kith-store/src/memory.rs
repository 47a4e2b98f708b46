//! In-memory backend.

use crate::error::StorageError;
use crate::kv::{KvPatch, KvRead, KvStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Key-value store held in a `BTreeMap`.
///
/// A patch is applied under one write lock, so readers see it entirely or not
/// at all.
#[derive(Debug)]
pub struct MemoryStore {
    data: RwLock<Option<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Some(BTreeMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvRead for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let guard = self.data.read();
        let data = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(data.get(key).cloned())
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        let guard = self.data.read();
        let data = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

impl KvStore for MemoryStore {
    fn apply(&self, patch: KvPatch) -> Result<(), StorageError> {
        let mut guard = self.data.write();
        let data = guard.as_mut().ok_or(StorageError::Closed)?;
        for (key, val) in patch.puts {
            data.insert(key, val);
        }
        for key in patch.deletes {
            data.remove(&key);
        }
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        self.data.write().take();
        Ok(())
    }
}
