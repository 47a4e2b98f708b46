//! Graph and authorization errors

use kith_core::FeedId;
use kith_store::StorageError;
use std::fmt;
use thiserror::Error;

/// Errors from building or querying the follow graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The source feed is not in the graph.
    ///
    /// Expected while the local feed has not been indexed yet, e.g. during an
    /// initial resync of an existing identity.
    #[error("no such source feed: {0}")]
    NoSuchSource(FeedId),

    /// Reading the contacts index failed.
    #[error("contacts index read failed: {0}")]
    Storage(#[from] StorageError),

    /// A contacts record could not be decoded.
    #[error("corrupt contacts record: {0}")]
    Corrupt(String),
}

/// Outcome of a rejected authorization.
#[derive(Debug, Error)]
pub enum AuthorizeError {
    /// The feed is further away than allowed, unreachable, or blocked.
    ///
    /// `actual_hops` is `path length - 2`; it is negative when no path exists.
    #[error("feed out of reach: {} (max {max_hops})", DisplayHops(.actual_hops))]
    OutOfReach {
        /// Intermediaries on the shortest path
        actual_hops: i64,
        /// Configured limit
        max_hops: u32,
    },

    /// The graph could not be built or searched.
    #[error("failed to evaluate follow graph: {0}")]
    Graph(#[from] GraphError),
}

struct DisplayHops<'a>(&'a i64);

impl fmt::Display for DisplayHops<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self.0 < 0 {
            write!(f, "no path")
        } else {
            write!(f, "{} hops", self.0)
        }
    }
}
