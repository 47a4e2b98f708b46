//! Follow graph snapshot.
//!
//! Built once per decision and never mutated afterwards, so concurrent
//! authorizations each work on their own consistent copy.

use crate::contacts::ContactState;
use kith_core::FeedId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Weight of a follow edge.
pub const FOLLOW_WEIGHT: u64 = 1;

/// Kind of a live edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Traversable trust edge
    Follow,
    /// Distrust edge; never traversed
    Block,
}

/// Edge payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Edge kind
    pub kind: EdgeKind,
    /// Traversal cost; only meaningful for follows
    pub weight: u64,
}

/// Directed follow/block graph between feeds.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) inner: DiGraph<FeedId, Edge>,
    pub(crate) nodes: HashMap<FeedId, NodeIndex>,
}

impl Graph {
    /// Graph without feeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(author, contact, state)` declarations.
    ///
    /// Both ends of every declaration become nodes, neutral ones included.
    /// When a pair appears more than once the last declaration wins.
    /// Self-declarations are ignored.
    pub fn from_declarations<I>(declarations: I) -> Self
    where
        I: IntoIterator<Item = (FeedId, FeedId, ContactState)>,
    {
        let mut graph = Self::new();
        for (from, to, state) in declarations {
            graph.declare(from, to, state);
        }
        graph
    }

    pub(crate) fn declare(&mut self, from: FeedId, to: FeedId, state: ContactState) {
        if from == to {
            return;
        }
        let a = self.node(from);
        let b = self.node(to);
        let kind = match state {
            ContactState::Follow => EdgeKind::Follow,
            ContactState::Block => EdgeKind::Block,
            ContactState::Neutral => {
                if let Some(edge) = self.inner.find_edge(a, b) {
                    self.inner.remove_edge(edge);
                }
                return;
            }
        };
        let weight = match kind {
            EdgeKind::Follow => FOLLOW_WEIGHT,
            EdgeKind::Block => 0,
        };
        self.inner.update_edge(a, b, Edge { kind, weight });
    }

    fn node(&mut self, feed: FeedId) -> NodeIndex {
        if let Some(index) = self.nodes.get(&feed) {
            return *index;
        }
        let index = self.inner.add_node(feed);
        self.nodes.insert(feed, index);
        index
    }

    /// Number of feeds in the graph.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of live follow and block edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether `feed` appears in any declaration.
    pub fn contains(&self, feed: &FeedId) -> bool {
        self.nodes.contains_key(feed)
    }

    /// Whether `from` currently follows `to`.
    pub fn follows(&self, from: &FeedId, to: &FeedId) -> bool {
        self.edge_kind(from, to) == Some(EdgeKind::Follow)
    }

    /// Whether `from` currently blocks `to`.
    pub fn blocks(&self, from: &FeedId, to: &FeedId) -> bool {
        self.edge_kind(from, to) == Some(EdgeKind::Block)
    }

    /// Feeds `feed` follows directly, sorted.
    pub fn followed_by(&self, feed: &FeedId) -> Vec<FeedId> {
        let Some(&a) = self.nodes.get(feed) else {
            return Vec::new();
        };
        let mut out: Vec<FeedId> = self
            .inner
            .edges(a)
            .filter(|edge| edge.weight().kind == EdgeKind::Follow)
            .map(|edge| self.inner[edge.target()])
            .collect();
        out.sort();
        out
    }

    fn edge_kind(&self, from: &FeedId, to: &FeedId) -> Option<EdgeKind> {
        let a = *self.nodes.get(from)?;
        let b = *self.nodes.get(to)?;
        let edge = self.inner.find_edge(a, b)?;
        Some(self.inner[edge].kind)
    }
}
