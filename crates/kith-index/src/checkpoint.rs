//! Index checkpoints.
//!
//! Stored in the index's own store under `!checkpoint/<name>` as a big-endian
//! `u64`, so the checkpoint commits in the same write as the entry it covers.

use crate::error::IndexError;
use kith_core::Seq;
use kith_store::{KvRead, KvStore};

/// Reserved key prefix; transforms may not write below it.
pub const CHECKPOINT_PREFIX: &[u8] = b"!checkpoint/";

/// Store key of the checkpoint for index `name`.
pub fn checkpoint_key(name: &str) -> Vec<u8> {
    [CHECKPOINT_PREFIX, name.as_bytes()].concat()
}

pub(crate) fn encode(seq: Seq) -> Vec<u8> {
    seq.to_be_bytes().to_vec()
}

/// Read the checkpoint of index `name`, `None` if it was never initialized.
pub(crate) fn read<S: KvRead + ?Sized>(store: &S, name: &str) -> Result<Option<Seq>, IndexError> {
    let raw = store
        .get(&checkpoint_key(name))
        .map_err(|e| IndexError::storage(name, e))?;
    raw.map(|bytes| {
        let bytes: [u8; 8] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IndexError::CorruptCheckpoint {
                index: name.to_string(),
            })?;
        Ok(Seq::from_be_bytes(bytes))
    })
    .transpose()
}

/// Read the checkpoint, writing `0` first if the index is new.
pub(crate) fn init<S: KvStore + ?Sized>(store: &S, name: &str) -> Result<Seq, IndexError> {
    match read(store, name)? {
        Some(seq) => Ok(seq),
        None => {
            store
                .set(&checkpoint_key(name), &encode(0))
                .map_err(|e| IndexError::storage(name, e))?;
            tracing::debug!(index = name, "initialized checkpoint");
            Ok(0)
        }
    }
}
