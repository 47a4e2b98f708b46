//! Key-value access traits.

use crate::error::StorageError;

/// Read side of a key-value store.
///
/// Implementations read from a consistent snapshot per call, so readers never
/// observe half of a concurrent [`KvStore::apply`].
pub trait KvRead: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// All pairs whose key starts with `prefix`, in key order.
    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError>;
}

/// Read-write key-value store.
pub trait KvStore: KvRead {
    /// Store a single value.
    fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        let mut patch = KvPatch::new();
        patch.put(key, value);
        self.apply(patch)
    }

    /// Commit every put and delete of `patch` in one atomic write.
    fn apply(&self, patch: KvPatch) -> Result<(), StorageError>;

    /// Release the backend. Later calls fail with [`StorageError::Closed`].
    fn close(&self) -> Result<(), StorageError>;
}

/// Batch of writes committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvPatch {
    /// Keys to insert or overwrite
    pub puts: Vec<(Vec<u8>, Vec<u8>)>,
    /// Keys to remove
    pub deletes: Vec<Vec<u8>>,
}

impl KvPatch {
    /// Empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert.
    pub fn put(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.puts.push((key.into(), value.into()));
        self
    }

    /// Queue a removal.
    pub fn delete(&mut self, key: impl Into<Vec<u8>>) -> &mut Self {
        self.deletes.push(key.into());
        self
    }

    /// Append the writes of `other` after ours.
    pub fn extend(&mut self, other: KvPatch) {
        self.puts.extend(other.puts);
        self.deletes.extend(other.deletes);
    }

    /// Whether the patch writes nothing.
    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}
