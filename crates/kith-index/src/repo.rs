//! Index store lifecycle.
//!
//! The repo owns the directory layout and the shutdown signal shared by every
//! serve loop it starts:
//!
//! ```text
//! <base>/indexes/<name>/index.redb
//! <base>/sublogs/<name>/index.redb
//! ```
//!
//! Each store is owned by exactly one index for the life of the process.
//! Opening the same index twice fails on the store's file lock.

use crate::config::RepoConfig;
use crate::error::IndexError;
use crate::handle::IndexHandle;
use crate::multilog::{MultiLogHandle, MultiLogTransform, SublogKeyer};
use crate::sink::{IndexServer, IndexSink};
use crate::transform::IndexTransform;
use kith_core::{CancellationToken, ShutdownSignal};
use kith_store::{KvStore, MemoryStore, RedbStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const INDEXES_DIR: &str = "indexes";
const SUBLOGS_DIR: &str = "sublogs";
const STORE_FILE: &str = "index.redb";

/// On-disk home of a node's indexes.
#[derive(Debug)]
pub struct Repo {
    base_path: PathBuf,
    shutdown: ShutdownSignal,
}

impl Repo {
    /// Open the repository described by `config`.
    pub fn open(config: &RepoConfig) -> Result<Self, IndexError> {
        let base_path = config.base_path.clone();
        if config.create_dirs {
            std::fs::create_dir_all(&base_path)?;
        } else if !base_path.is_dir() {
            return Err(IndexError::Config(format!(
                "base path {} does not exist",
                base_path.display()
            )));
        }
        tracing::info!(path = %base_path.display(), "opened repo");
        Ok(Self {
            base_path,
            shutdown: ShutdownSignal::new(),
        })
    }

    /// Path of `rel` below the repo root.
    pub fn path<I, P>(&self, rel: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut path = self.base_path.clone();
        path.extend(rel);
        path
    }

    /// Open (or create) the index `name` folded by `transform`.
    ///
    /// Returns the read handle and the serve task; nothing is folded until
    /// the task runs.
    pub fn open_index(
        &self,
        name: &str,
        transform: Arc<dyn IndexTransform>,
    ) -> Result<(IndexHandle, IndexServer), IndexError> {
        let store = self.open_store(INDEXES_DIR, name)?;
        Self::wire(name, store, transform)
    }

    /// Open (or create) the multilog `name`, filing entries by `keyer`.
    pub fn open_multilog<K>(
        &self,
        name: &str,
        keyer: K,
    ) -> Result<(MultiLogHandle, IndexServer), IndexError>
    where
        K: SublogKeyer + 'static,
    {
        let store = self.open_store(SUBLOGS_DIR, name)?;
        let (handle, server) = Self::wire(name, store, Arc::new(MultiLogTransform::new(keyer)))?;
        Ok((MultiLogHandle::new(handle), server))
    }

    /// Same wiring as [`Repo::open_index`] over a fresh in-memory store.
    pub fn open_memory_index(
        name: &str,
        transform: Arc<dyn IndexTransform>,
    ) -> Result<(IndexHandle, IndexServer), IndexError> {
        validate_name(name)?;
        Self::wire(name, Arc::new(MemoryStore::new()), transform)
    }

    /// Token that fires when [`Repo::close`] is called.
    pub fn cancellation_token(&self) -> Arc<dyn CancellationToken> {
        self.shutdown.token()
    }

    /// Signal every serve loop started with this repo's token to stop.
    pub fn close(&self) {
        tracing::info!(path = %self.base_path.display(), "closing repo");
        self.shutdown.trigger();
    }

    fn open_store(&self, kind: &str, name: &str) -> Result<Arc<dyn KvStore>, IndexError> {
        validate_name(name)?;
        let dir = self.path([kind, name]);
        std::fs::create_dir_all(&dir)?;
        let store = RedbStore::open(dir.join(STORE_FILE))
            .map_err(|e| IndexError::storage(name, e))?;
        Ok(Arc::new(store))
    }

    fn wire(
        name: &str,
        store: Arc<dyn KvStore>,
        transform: Arc<dyn IndexTransform>,
    ) -> Result<(IndexHandle, IndexServer), IndexError> {
        let sink = IndexSink::new(name, store.clone(), transform)?;
        tracing::info!(index = name, checkpoint = sink.checkpoint(), "opened index");
        Ok((
            IndexHandle::new(name, store),
            IndexServer::new(Arc::new(sink)),
        ))
    }
}

fn validate_name(name: &str) -> Result<(), IndexError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0');
    if valid {
        Ok(())
    } else {
        Err(IndexError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_index_names_validated() {
        assert!(validate_name("contacts").is_ok());
        assert!(validate_name("user-feeds").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            assert_matches!(validate_name(bad), Err(IndexError::InvalidName(_)));
        }
    }

    #[test]
    fn test_open_index_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::open(&RepoConfig::new(dir.path())).unwrap();
        let transform: Arc<dyn IndexTransform> = Arc::new(MultiLogTransform::new(crate::ByAuthor));

        let (handle, _server) = repo.open_index("authors", transform).unwrap();
        assert!(dir.path().join("indexes/authors/index.redb").is_file());
        assert_eq!(handle.checkpoint().unwrap(), 0);
    }

    #[test]
    fn test_missing_base_without_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = RepoConfig {
            base_path: dir.path().join("absent"),
            create_dirs: false,
        };
        assert_matches!(Repo::open(&config), Err(IndexError::Config(_)));
    }

    #[test]
    fn test_double_open_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::open(&RepoConfig::new(dir.path())).unwrap();
        let _first = repo.open_multilog("feeds", crate::ByAuthor).unwrap();

        assert_matches!(
            repo.open_multilog("feeds", crate::ByAuthor),
            Err(IndexError::Storage { .. })
        );
    }

    #[test]
    fn test_close_fires_token() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repo::open(&RepoConfig::new(dir.path())).unwrap();
        let token = repo.cancellation_token();
        assert!(!token.is_cancelled());
        repo.close();
        assert!(token.is_cancelled());
    }
}
