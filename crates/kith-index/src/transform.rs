//! Fold step of an index.

use crate::error::TransformError;
use kith_core::LogEntry;
use kith_store::{KvPatch, KvRead};

/// Pure fold step `(prior state, entry) -> state delta`.
///
/// `prior` reflects every entry before `entry` and nothing after it. The
/// returned patch is committed atomically with the index checkpoint. Entries
/// the index does not care about return an empty patch.
pub trait IndexTransform: Send + Sync {
    /// Compute the writes that fold `entry` into the index.
    fn apply(&self, prior: &dyn KvRead, entry: &LogEntry) -> Result<KvPatch, TransformError>;
}

impl<F> IndexTransform for F
where
    F: Fn(&dyn KvRead, &LogEntry) -> Result<KvPatch, TransformError> + Send + Sync,
{
    fn apply(&self, prior: &dyn KvRead, entry: &LogEntry) -> Result<KvPatch, TransformError> {
        self(prior, entry)
    }
}
