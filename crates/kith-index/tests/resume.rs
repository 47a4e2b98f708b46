//! Restart behaviour of on-disk indexes.
//!
//! Covers resumption from a persisted checkpoint, cancellation of the live
//! loop through the repo, and multilog indexes served next to plain ones.

use kith_core::{Content, FeedId, Log, LogEntry, MemoryLog, Message, Seq};
use kith_index::{ByAuthor, IndexError, IndexTransform, Repo, RepoConfig, TransformError};
use kith_store::{KvPatch, KvRead};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn feed(seed: u8) -> FeedId {
    FeedId::from_bytes([seed; 32])
}

fn post(author: u8, n: u64) -> Message {
    Message::new(
        feed(author),
        n,
        Content::Post {
            text: format!("post {n}"),
        },
    )
}

/// Counts entries per sequence and keeps a running total in the index.
struct CountingTransform {
    applied: Mutex<Vec<Seq>>,
}

impl CountingTransform {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            applied: Mutex::new(Vec::new()),
        })
    }

    fn applied(&self) -> Vec<Seq> {
        self.applied.lock().clone()
    }
}

impl IndexTransform for CountingTransform {
    fn apply(&self, prior: &dyn KvRead, entry: &LogEntry) -> Result<KvPatch, TransformError> {
        let total = match prior.get(b"total")? {
            Some(raw) => u64::from_be_bytes(
                raw.as_slice()
                    .try_into()
                    .map_err(|_| TransformError::Decode("total".into()))?,
            ),
            None => 0,
        };
        self.applied.lock().push(entry.seq);
        let mut patch = KvPatch::new();
        patch.put(b"total".to_vec(), (total + 1).to_be_bytes().to_vec());
        Ok(patch)
    }
}

fn total(handle: &impl KvRead) -> u64 {
    handle
        .get(b"total")
        .unwrap()
        .map(|raw| u64::from_be_bytes(raw.as_slice().try_into().unwrap()))
        .unwrap_or(0)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("kith_index=trace")
        .with_test_writer()
        .try_init();
}

async fn wait_for_checkpoint(read: impl Fn() -> Seq, target: Seq) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while read() < target {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("index did not reach target checkpoint");
}

// ============================================================================
// Resumption
// ============================================================================

#[tokio::test]
async fn test_resume_applies_only_new_entries() {
    let dir = tempfile::tempdir().unwrap();
    let config = RepoConfig::new(dir.path());
    let log = MemoryLog::new();
    for n in 1..=10 {
        log.append(post(1, n)).unwrap();
    }

    // First process: fold 1..=10 and shut down.
    {
        let repo = Repo::open(&config).unwrap();
        let first = CountingTransform::new();
        let (handle, server) = repo.open_index("count", first.clone()).unwrap();
        assert_eq!(server.catch_up(&log).await.unwrap(), 10);
        assert_eq!(first.applied(), (1..=10).collect::<Vec<_>>());
        handle.close().unwrap();
    }

    for n in 11..=15 {
        log.append(post(1, n)).unwrap();
    }

    // Second process: resumes after the persisted checkpoint.
    let repo = Repo::open(&config).unwrap();
    let second = CountingTransform::new();
    let (handle, server) = repo.open_index("count", second.clone()).unwrap();
    assert_eq!(handle.checkpoint().unwrap(), 10);

    assert_eq!(server.catch_up(&log).await.unwrap(), 15);
    assert_eq!(second.applied(), vec![11, 12, 13, 14, 15]);
    assert_eq!(total(&handle), 15);
}

#[tokio::test]
async fn test_failed_serve_restarts_from_last_good_entry() {
    init_tracing();
    let log = MemoryLog::new();
    for n in 1..=3 {
        log.append(post(1, n)).unwrap();
    }

    let fail_at_two: Arc<dyn IndexTransform> = Arc::new(|_: &dyn KvRead, entry: &LogEntry| {
        if entry.seq == 2 {
            return Err(TransformError::Encode("refusing entry 2".into()));
        }
        let mut patch = KvPatch::new();
        patch.put(format!("seq/{}", entry.seq).into_bytes(), Vec::new());
        Ok::<_, TransformError>(patch)
    });

    let (handle, server) = Repo::open_memory_index("flaky", fail_at_two).unwrap();
    let err = server
        .serve(Arc::new(kith_core::NeverCancel), Arc::new(log.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Transform { seq: 2, .. }));
    assert_eq!(handle.checkpoint().unwrap(), 1);
    assert_eq!(handle.get(b"seq/3").unwrap(), None);
}

// ============================================================================
// Live serving
// ============================================================================

#[tokio::test]
async fn test_repo_close_stops_all_serve_loops() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let repo = Repo::open(&RepoConfig::new(dir.path())).unwrap();
    let log: Arc<MemoryLog> = Arc::new(MemoryLog::new());

    let counter = CountingTransform::new();
    let (count_handle, count_server) = repo.open_index("count", counter.clone()).unwrap();
    let (feeds, feeds_server) = repo.open_multilog("user-feeds", ByAuthor).unwrap();

    let shared: Arc<dyn Log> = log.clone();
    let count_task = tokio::spawn(count_server.serve(repo.cancellation_token(), shared.clone()));
    let feeds_task = tokio::spawn(feeds_server.serve(repo.cancellation_token(), shared));

    log.append(post(1, 1)).unwrap();
    log.append(post(2, 1)).unwrap();
    log.append(post(1, 2)).unwrap();

    wait_for_checkpoint(|| count_handle.checkpoint().unwrap(), 3).await;
    wait_for_checkpoint(|| feeds.index().checkpoint().unwrap(), 3).await;

    repo.close();
    count_task.await.unwrap().unwrap();
    feeds_task.await.unwrap().unwrap();

    assert_eq!(total(&count_handle), 3);
    assert_eq!(feeds.feed(&feed(1)).unwrap(), vec![1, 3]);
    assert_eq!(feeds.feed(&feed(2)).unwrap(), vec![2]);
    assert_eq!(
        feeds.keys().unwrap(),
        vec![feed(1).as_bytes().to_vec(), feed(2).as_bytes().to_vec()]
    );

    // Entries appended after shutdown are picked up by the next run.
    log.append(post(2, 2)).unwrap();
    assert_eq!(count_handle.checkpoint().unwrap(), 3);
}
