//! # Kith Store
//!
//! Embedded key-value storage behind the derived indexes.
//!
//! - [`KvRead`]: point reads and prefix scans, the only access readers get
//! - [`KvStore`]: adds writes; [`KvStore::apply`] commits a [`KvPatch`]
//!   atomically, which is what makes index checkpoints crash-safe
//! - [`RedbStore`]: on-disk backend built on `redb`
//! - [`MemoryStore`]: in-process backend for tests and ephemeral nodes

pub mod error;
pub mod kv;
pub mod memory;
pub mod redb_store;

pub use error::StorageError;
pub use kv::{KvPatch, KvRead, KvStore};
pub use memory::MemoryStore;
pub use redb_store::RedbStore;
