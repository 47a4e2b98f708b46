//! # Kith Graph
//!
//! Decides whether a remote feed may be replicated, based on how far it sits
//! from the local feed in the follow graph.
//!
//! - [`contacts`]: index transform that keeps the latest follow/block state
//!   for every (author, contact) pair
//! - [`Graph`]: immutable snapshot of that index, rebuilt per decision
//! - [`Lookup`]: single-source shortest paths over follow edges
//! - [`HopAuthorizer`]: accepts feeds within `max_hops` of the local feed
//!
//! # Hop accounting
//!
//! A path includes both ends, so for `me → a → b → target` the path has four
//! feeds and the target is two hops away: only intermediaries count. A feed
//! the local node follows directly is zero hops away.
//!
//! # Block policy
//!
//! Blocks are direct-only. A feed blocked by the local feed is rejected no
//! matter how close it is, and is never used as an intermediary. A block
//! declared by any other feed only replaces that feed's own follow edge.

pub mod authorizer;
pub mod builder;
pub mod config;
pub mod contacts;
pub mod dijkstra;
pub mod error;
pub mod graph;

pub use authorizer::{Authorizer, HopAuthorizer};
pub use builder::{GraphBuilder, IndexGraphBuilder};
pub use config::{AuthorizerConfig, ConfigError};
pub use contacts::{open_contacts_index, ContactRecord, ContactState, ContactsTransform, CONTACTS_INDEX};
pub use dijkstra::{Distance, Lookup};
pub use error::{AuthorizeError, GraphError};
pub use graph::{EdgeKind, Graph};
