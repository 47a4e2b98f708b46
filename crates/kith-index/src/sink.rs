//! Index sink: folds root log entries into an index store.
//!
//! # Invariants
//!
//! - Entries fold in strictly increasing sequence order with no gaps.
//! - Each entry's writes and its checkpoint commit in one `KvStore::apply`,
//!   so after a crash the index either contains the entry and its checkpoint
//!   or neither.
//! - Entries at or below the checkpoint are never folded again.

use crate::checkpoint::{self, checkpoint_key, CHECKPOINT_PREFIX};
use crate::error::IndexError;
use crate::transform::IndexTransform;
use futures::StreamExt;
use kith_core::{CancellationToken, Log, LogEntry, QuerySpec, Seq};
use kith_store::{KvPatch, KvRead, KvStore, StorageError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Outcome of offering one entry to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The entry was folded and the checkpoint advanced to it.
    Folded(Seq),
    /// The entry was already covered by the checkpoint.
    Skipped(Seq),
}

/// Read view over the sink's own store, handed to transforms.
struct PriorState<'a>(&'a dyn KvStore);

impl KvRead for PriorState<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        self.0.get(key)
    }

    fn scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StorageError> {
        self.0.scan(prefix)
    }
}

/// Folds entries into one index store through a transform.
pub struct IndexSink {
    name: String,
    store: Arc<dyn KvStore>,
    transform: Arc<dyn IndexTransform>,
    // Last committed sequence; the lock also serializes folds.
    checkpoint: Mutex<Seq>,
}

impl std::fmt::Debug for IndexSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexSink")
            .field("name", &self.name)
            .field("checkpoint", &*self.checkpoint.lock())
            .finish_non_exhaustive()
    }
}

impl IndexSink {
    /// Bind a transform to a store, creating the checkpoint if the index is new.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn KvStore>,
        transform: Arc<dyn IndexTransform>,
    ) -> Result<Self, IndexError> {
        let name = name.into();
        let seq = checkpoint::init(store.as_ref(), &name)?;
        Ok(Self {
            name,
            store,
            transform,
            checkpoint: Mutex::new(seq),
        })
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sequence of the last folded entry.
    pub fn checkpoint(&self) -> Seq {
        *self.checkpoint.lock()
    }

    /// Query that resumes right after the checkpoint.
    pub fn query_spec(&self, live: bool) -> QuerySpec {
        QuerySpec {
            start: self.checkpoint() + 1,
            live,
        }
    }

    /// Fold one entry and advance the checkpoint in the same commit.
    pub fn apply(&self, entry: &LogEntry) -> Result<Applied, IndexError> {
        let mut checkpoint = self.checkpoint.lock();
        if entry.seq <= *checkpoint {
            tracing::trace!(index = %self.name, seq = entry.seq, "skipping folded entry");
            return Ok(Applied::Skipped(entry.seq));
        }
        let expected = *checkpoint + 1;
        if entry.seq != expected {
            return Err(IndexError::SequenceGap {
                index: self.name.clone(),
                expected,
                got: entry.seq,
            });
        }

        let mut patch = self
            .transform
            .apply(&PriorState(self.store.as_ref()), entry)
            .map_err(|source| IndexError::Transform {
                index: self.name.clone(),
                seq: entry.seq,
                source,
            })?;

        let reserved = patch
            .puts
            .iter()
            .map(|(k, _)| k)
            .chain(patch.deletes.iter())
            .any(|k| k.starts_with(CHECKPOINT_PREFIX));
        if reserved {
            return Err(IndexError::ReservedKey {
                index: self.name.clone(),
                seq: entry.seq,
            });
        }

        patch.put(checkpoint_key(&self.name), checkpoint::encode(entry.seq));
        self.store
            .apply(patch)
            .map_err(|e| IndexError::storage(&self.name, e))?;
        *checkpoint = entry.seq;

        tracing::trace!(index = %self.name, seq = entry.seq, "folded entry");
        Ok(Applied::Folded(entry.seq))
    }

    /// Fold everything the log holds right now, then return the checkpoint.
    pub async fn catch_up(&self, log: &dyn Log) -> Result<Seq, IndexError> {
        let mut stream = log
            .query(self.query_spec(false))
            .await
            .map_err(|e| IndexError::log(&self.name, e))?;
        while let Some(next) = stream.next().await {
            let entry = next.map_err(|e| IndexError::log(&self.name, e))?;
            self.apply(&entry)?;
        }
        Ok(self.checkpoint())
    }

    /// Follow the log live until `token` fires or the log ends.
    ///
    /// Returns `Ok(())` on cancellation or end of log. Any failure stops the
    /// loop before a later entry can be folded.
    pub async fn serve(
        &self,
        token: Arc<dyn CancellationToken>,
        log: &dyn Log,
    ) -> Result<(), IndexError> {
        let spec = self.query_spec(true);
        let mut stream = log
            .query(spec)
            .await
            .map_err(|e| IndexError::log(&self.name, e))?;
        tracing::info!(index = %self.name, start = spec.start, "index serve loop started");

        let outcome = loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::info!(index = %self.name, checkpoint = self.checkpoint(), "index serve loop cancelled");
                    break Ok(());
                }
                next = stream.next() => match next {
                    Some(Ok(entry)) => {
                        if let Err(e) = self.apply(&entry) {
                            break Err(e);
                        }
                    }
                    Some(Err(e)) => break Err(IndexError::log(&self.name, e)),
                    None => {
                        tracing::info!(index = %self.name, checkpoint = self.checkpoint(), "root log ended");
                        break Ok(());
                    }
                },
            }
        };

        if let Err(e) = &outcome {
            tracing::warn!(index = %self.name, checkpoint = self.checkpoint(), error = %e, "index serve loop failed");
        }
        outcome
    }
}

/// Owned serve task for one index, returned by [`crate::Repo::open_index`].
#[derive(Debug, Clone)]
pub struct IndexServer {
    sink: Arc<IndexSink>,
}

impl IndexServer {
    pub(crate) fn new(sink: Arc<IndexSink>) -> Self {
        Self { sink }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        self.sink.name()
    }

    /// Run the live fold loop; see [`IndexSink::serve`].
    pub async fn serve(
        self,
        token: Arc<dyn CancellationToken>,
        log: Arc<dyn Log>,
    ) -> Result<(), IndexError> {
        self.sink.serve(token, log.as_ref()).await
    }

    /// One-shot fold to the current end of the log; see [`IndexSink::catch_up`].
    pub async fn catch_up(&self, log: &dyn Log) -> Result<Seq, IndexError> {
        self.sink.catch_up(log).await
    }
}
