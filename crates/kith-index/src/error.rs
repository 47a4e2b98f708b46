//! Index error types

use kith_core::{LogError, Seq};
use kith_store::StorageError;
use thiserror::Error;

/// Failure of a transform to fold one entry.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A previously stored value could not be decoded.
    #[error("failed to decode stored value: {0}")]
    Decode(String),

    /// A new value could not be encoded.
    #[error("failed to encode value: {0}")]
    Encode(String),

    /// Reading prior state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors from opening or serving an index.
///
/// Any error returned from a serve loop is fatal to that loop. The checkpoint
/// still names the last committed entry, so restarting the loop is safe.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Backing store failure.
    #[error("index {index}: storage failure: {source}")]
    Storage {
        /// Index name
        index: String,
        /// Underlying failure
        #[source]
        source: StorageError,
    },

    /// Root log failure.
    #[error("index {index}: root log failure: {source}")]
    Log {
        /// Index name
        index: String,
        /// Underlying failure
        #[source]
        source: LogError,
    },

    /// The transform rejected an entry.
    #[error("index {index}: transform failed at seq {seq}: {source}")]
    Transform {
        /// Index name
        index: String,
        /// Entry that could not be folded
        seq: Seq,
        /// Underlying failure
        #[source]
        source: TransformError,
    },

    /// The transform tried to write under the reserved checkpoint prefix.
    #[error("index {index}: transform wrote reserved key at seq {seq}")]
    ReservedKey {
        /// Index name
        index: String,
        /// Entry being folded
        seq: Seq,
    },

    /// The log skipped past the next expected entry.
    #[error("index {index}: expected seq {expected}, got {got}")]
    SequenceGap {
        /// Index name
        index: String,
        /// Next sequence the index needs
        expected: Seq,
        /// Sequence the log produced
        got: Seq,
    },

    /// The stored checkpoint is not a valid sequence.
    #[error("index {index}: corrupt checkpoint")]
    CorruptCheckpoint {
        /// Index name
        index: String,
    },

    /// Index names must be usable as a single directory name.
    #[error("invalid index name {0:?}")]
    InvalidName(String),

    /// Repository configuration is unusable.
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    pub(crate) fn storage(index: &str, source: StorageError) -> Self {
        Self::Storage {
            index: index.to_string(),
            source,
        }
    }

    pub(crate) fn log(index: &str, source: LogError) -> Self {
        Self::Log {
            index: index.to_string(),
            source,
        }
    }
}
