//! In-memory root log.
//!
//! Appends publish the new head through a `watch` channel so live readers
//! park on the channel instead of polling.

use crate::log::{EntryStream, Log, LogEntry, LogError, QuerySpec, Seq};
use crate::message::Message;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default)]
struct Head {
    seq: Seq,
    closed: bool,
}

#[derive(Debug)]
struct Inner {
    entries: RwLock<Vec<LogEntry>>,
    head: watch::Sender<Head>,
}

impl Inner {
    fn get(&self, seq: Seq) -> Option<LogEntry> {
        let index = usize::try_from(seq.checked_sub(1)?).ok()?;
        self.entries.read().get(index).cloned()
    }
}

/// Root log kept in memory. Cloning shares the same log.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    inner: Arc<Inner>,
}

impl MemoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        let (head, _) = watch::channel(Head::default());
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(Vec::new()),
                head,
            }),
        }
    }

    /// Append a message and return its sequence.
    pub fn append(&self, message: Message) -> Result<Seq, LogError> {
        let seq = {
            let mut entries = self.inner.entries.write();
            if self.inner.head.borrow().closed {
                return Err(LogError::Closed);
            }
            let seq = entries.len() as Seq + 1;
            entries.push(LogEntry { seq, message });
            seq
        };
        self.inner.head.send_modify(|head| head.seq = seq);
        Ok(seq)
    }

    /// Sequence of the newest entry, `0` when empty.
    pub fn head(&self) -> Seq {
        self.inner.head.borrow().seq
    }

    /// Entry at `seq`, if present.
    pub fn get(&self, seq: Seq) -> Option<LogEntry> {
        self.inner.get(seq)
    }

    /// Close the log: appends fail and live streams end after draining.
    pub fn close(&self) {
        self.inner.head.send_modify(|head| head.closed = true);
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

struct Cursor {
    inner: Arc<Inner>,
    next: Seq,
    live: bool,
    head_rx: watch::Receiver<Head>,
}

#[async_trait]
impl Log for MemoryLog {
    async fn query(&self, spec: QuerySpec) -> Result<EntryStream, LogError> {
        let cursor = Cursor {
            inner: self.inner.clone(),
            next: spec.start.max(1),
            live: spec.live,
            head_rx: self.inner.head.subscribe(),
        };

        let stream = futures::stream::unfold(cursor, |mut cursor| async move {
            loop {
                // Mark the head as seen before looking, so an append racing
                // with the lookup still wakes `changed()` below.
                let head = *cursor.head_rx.borrow_and_update();
                if let Some(entry) = cursor.inner.get(cursor.next) {
                    cursor.next += 1;
                    return Some((Ok::<_, LogError>(entry), cursor));
                }
                if !cursor.live || head.closed {
                    return None;
                }
                if cursor.head_rx.changed().await.is_err() {
                    return None;
                }
            }
        });

        Ok(Box::pin(stream))
    }
}
