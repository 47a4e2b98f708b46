//! # Kith Index
//!
//! Derived views of the root log, kept up to date while the log grows.
//!
//! An index is a persistent key-value store plus a checkpoint: the sequence of
//! the last root log entry folded into it. [`IndexSink`] folds entries through
//! a caller-supplied [`IndexTransform`] and commits each entry's writes together
//! with the new checkpoint, so a restart resumes exactly after the last
//! committed entry.
//!
//! [`Repo`] owns the on-disk layout and hands out an [`IndexHandle`] for reads
//! plus an [`IndexServer`] that runs the live fold loop until cancelled.
//!
//! ```ignore
//! let repo = Repo::open(&RepoConfig::new("/var/lib/kith"))?;
//! let (handle, server) = repo.open_index("contacts", Arc::new(ContactsTransform))?;
//! tokio::spawn(server.serve(repo.cancellation_token(), log.clone()));
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod handle;
pub mod multilog;
pub mod repo;
pub mod sink;
pub mod transform;

pub use checkpoint::{checkpoint_key, CHECKPOINT_PREFIX};
pub use config::RepoConfig;
pub use error::{IndexError, TransformError};
pub use handle::IndexHandle;
pub use multilog::{ByAuthor, MultiLogHandle, MultiLogTransform, SublogKeyer};
pub use repo::Repo;
pub use sink::{Applied, IndexServer, IndexSink};
pub use transform::IndexTransform;
