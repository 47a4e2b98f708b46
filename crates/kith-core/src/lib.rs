//! # Kith Core
//!
//! Shared vocabulary for the Kith node:
//!
//! - [`FeedId`]: the identity of a feed, derived from its ed25519 public key
//! - [`Message`] and [`Content`]: what authors publish into their feeds
//! - [`Log`]: the root log every feed is stored in, with live queries
//! - [`CancellationToken`]: cooperative shutdown for long-running loops
//!
//! The root log itself is owned by the storage layer of the node. This crate
//! only describes how it is read, and ships [`MemoryLog`] as an in-process
//! implementation for tests and ephemeral nodes.

pub mod identifiers;
pub mod log;
pub mod memory_log;
pub mod message;
pub mod task;

pub use identifiers::{FeedId, FeedIdError};
pub use log::{EntryStream, Log, LogEntry, LogError, QuerySpec, Seq};
pub use memory_log::MemoryLog;
pub use message::{ContactContent, Content, Message};
pub use task::{CancellationToken, NeverCancel, ShutdownSignal};
