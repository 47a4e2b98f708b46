//! Multilog indexes: the root log split into sublogs.
//!
//! Each entry is filed under zero or more sublog keys chosen by a
//! [`SublogKeyer`]. A sublog lists root log sequences in increasing order, so
//! `ByAuthor` gives every feed its own ordered view of the root log.
//!
//! Layout: `sublog/<key len: u32 BE><key><root seq: u64 BE>` → empty value.

use crate::error::{IndexError, TransformError};
use crate::handle::IndexHandle;
use crate::transform::IndexTransform;
use kith_core::{FeedId, LogEntry, Seq};
use kith_store::{KvPatch, KvRead};
use std::collections::BTreeSet;

const SUBLOG_PREFIX: &[u8] = b"sublog/";

/// Chooses the sublogs an entry belongs to.
pub trait SublogKeyer: Send + Sync {
    /// Sublog keys for `entry`; empty to leave it out of every sublog.
    fn keys(&self, entry: &LogEntry) -> Vec<Vec<u8>>;
}

/// One sublog per author feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByAuthor;

impl SublogKeyer for ByAuthor {
    fn keys(&self, entry: &LogEntry) -> Vec<Vec<u8>> {
        vec![entry.message.author.as_bytes().to_vec()]
    }
}

fn sublog_prefix(key: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SUBLOG_PREFIX.len() + 4 + key.len());
    out.extend_from_slice(SUBLOG_PREFIX);
    out.extend_from_slice(&(key.len() as u32).to_be_bytes());
    out.extend_from_slice(key);
    out
}

fn sublog_entry_key(key: &[u8], seq: Seq) -> Vec<u8> {
    let mut out = sublog_prefix(key);
    out.extend_from_slice(&seq.to_be_bytes());
    out
}

/// Splits a stored key into (sublog key, root seq).
fn decode_entry_key(raw: &[u8]) -> Option<(&[u8], Seq)> {
    let rest = raw.strip_prefix(SUBLOG_PREFIX)?;
    let len = u32::from_be_bytes(rest.get(..4)?.try_into().ok()?) as usize;
    let key = rest.get(4..4 + len)?;
    let seq = rest.get(4 + len..)?;
    let seq = Seq::from_be_bytes(seq.try_into().ok()?);
    Some((key, seq))
}

/// Index transform that files entries into sublogs.
#[derive(Debug, Clone, Default)]
pub struct MultiLogTransform<K> {
    keyer: K,
}

impl<K: SublogKeyer> MultiLogTransform<K> {
    /// Transform filing entries by `keyer`.
    pub fn new(keyer: K) -> Self {
        Self { keyer }
    }
}

impl<K: SublogKeyer> IndexTransform for MultiLogTransform<K> {
    fn apply(&self, _prior: &dyn KvRead, entry: &LogEntry) -> Result<KvPatch, TransformError> {
        let mut patch = KvPatch::new();
        for key in self.keyer.keys(entry) {
            patch.put(sublog_entry_key(&key, entry.seq), Vec::new());
        }
        Ok(patch)
    }
}

/// Read handle of a multilog index.
#[derive(Debug, Clone)]
pub struct MultiLogHandle {
    index: IndexHandle,
}

impl MultiLogHandle {
    pub(crate) fn new(index: IndexHandle) -> Self {
        Self { index }
    }

    /// Underlying index handle.
    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Root log sequences filed under `key`, oldest first.
    pub fn sublog(&self, key: &[u8]) -> Result<Vec<Seq>, IndexError> {
        let pairs = self
            .index
            .scan(&sublog_prefix(key))
            .map_err(|e| IndexError::storage(self.index.name(), e))?;
        pairs
            .iter()
            .map(|(raw, _)| {
                decode_entry_key(raw)
                    .map(|(_, seq)| seq)
                    .ok_or_else(|| self.corrupt())
            })
            .collect()
    }

    /// Root log sequences authored by `feed`, for a [`ByAuthor`] multilog.
    pub fn feed(&self, feed: &FeedId) -> Result<Vec<Seq>, IndexError> {
        self.sublog(feed.as_bytes())
    }

    /// Every sublog key with at least one entry, in key order.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, IndexError> {
        let pairs = self
            .index
            .scan(SUBLOG_PREFIX)
            .map_err(|e| IndexError::storage(self.index.name(), e))?;
        let mut keys = BTreeSet::new();
        for (raw, _) in &pairs {
            let (key, _) = decode_entry_key(raw).ok_or_else(|| self.corrupt())?;
            keys.insert(key.to_vec());
        }
        Ok(keys.into_iter().collect())
    }

    fn corrupt(&self) -> IndexError {
        IndexError::storage(
            self.index.name(),
            kith_store::StorageError::Codec("malformed sublog key".into()),
        )
    }
}
