//! Read handle of an open index.

use crate::checkpoint;
use crate::error::IndexError;
use kith_core::Seq;
use kith_store::{KvRead, KvStore, StorageError};
use std::sync::Arc;

/// Read-only access to an index store.
///
/// Readers never write: the only writer of an index is its serve loop. Each
/// read sees a consistent snapshot, possibly a few entries behind the log.
#[derive(Clone)]
pub struct IndexHandle {
    name: String,
    store: Arc<dyn KvStore>,
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl IndexHandle {
    pub(crate) fn new(name: impl Into<String>, store: Arc<dyn KvStore>) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sequence of the last entry folded into the index.
    pub fn checkpoint(&self) -> Result<Seq, IndexError> {
        Ok(checkpoint::read(self.store.as_ref(), &self.name)?.unwrap_or(0))
    }

    /// Close the backing store. Call once the serve loop has stopped.
    pub fn close(&self) -> Result<(), IndexError> {
        tracing::info!(index = %self.name, "closing index");
        self.store
            .close()
            .map_err(|e| IndexError::storage(&self.name, e))
    }
}

impl KvRead for IndexHandle {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.store.get(key)
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        self.store.scan(prefix)
    }
}
