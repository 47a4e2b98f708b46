//! Root log interface
//!
//! The root log holds every message the node has stored, numbered by a dense
//! sequence starting at 1. Indexes read it through [`Log::query`], optionally
//! staying subscribed for entries appended later.

use crate::message::Message;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// Root log sequence number. `0` means "nothing yet".
pub type Seq = u64;

/// One root log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Position in the root log
    pub seq: Seq,
    /// Stored message
    pub message: Message,
}

/// Parameters of a root log query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    /// First sequence to return
    pub start: Seq,
    /// Keep the stream open and wait for new entries at the end of the log
    pub live: bool,
}

impl QuerySpec {
    /// Live query starting at `start`.
    pub fn live_from(start: Seq) -> Self {
        Self { start, live: true }
    }

    /// One-shot query from `start` to the current end of the log.
    pub fn from(start: Seq) -> Self {
        Self { start, live: false }
    }
}

/// Ordered stream of entries produced by a query.
pub type EntryStream = BoxStream<'static, Result<LogEntry, LogError>>;

/// Errors from reading the root log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// The log was closed.
    #[error("root log closed")]
    Closed,

    /// A stored entry could not be decoded.
    #[error("failed to decode entry {seq}: {reason}")]
    Decode {
        /// Sequence of the broken entry
        seq: Seq,
        /// Decoder message
        reason: String,
    },
}

/// Read access to the root log.
///
/// Streams yield entries in strictly increasing sequence order. Live streams
/// suspend at the end of the log until an entry is appended or the log is
/// closed.
#[async_trait]
pub trait Log: Send + Sync {
    /// Open a stream according to `spec`.
    async fn query(&self, spec: QuerySpec) -> Result<EntryStream, LogError>;
}
