//! Graph construction from the contacts index.

use crate::contacts::{decode_contact_key, ContactRecord, CONTACT_PREFIX};
use crate::error::GraphError;
use crate::graph::Graph;
use kith_store::KvRead;

/// Source of fresh graph snapshots.
pub trait GraphBuilder: Send + Sync {
    /// Build a snapshot of the current follow graph.
    fn build(&self) -> Result<Graph, GraphError>;
}

/// A fixed graph is its own builder.
impl GraphBuilder for Graph {
    fn build(&self) -> Result<Graph, GraphError> {
        Ok(self.clone())
    }
}

/// Builds graphs by scanning a contacts index.
#[derive(Debug, Clone)]
pub struct IndexGraphBuilder<R> {
    index: R,
}

impl<R: KvRead> IndexGraphBuilder<R> {
    /// Builder over `index`, which must be written by
    /// [`ContactsTransform`](crate::ContactsTransform).
    pub fn new(index: R) -> Self {
        Self { index }
    }

    /// Underlying index reader.
    pub fn index(&self) -> &R {
        &self.index
    }
}

impl<R: KvRead> GraphBuilder for IndexGraphBuilder<R> {
    fn build(&self) -> Result<Graph, GraphError> {
        let records = self.index.scan(CONTACT_PREFIX)?;
        let mut graph = Graph::new();
        for (key, value) in records {
            let (author, contact) = decode_contact_key(&key)
                .ok_or_else(|| GraphError::Corrupt(format!("bad contact key of {} bytes", key.len())))?;
            let record = ContactRecord::decode(&value)
                .map_err(|e| GraphError::Corrupt(format!("{author} -> {contact}: {e}")))?;
            graph.declare(author, contact, record.state);
        }
        tracing::trace!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built follow graph"
        );
        Ok(graph)
    }
}
