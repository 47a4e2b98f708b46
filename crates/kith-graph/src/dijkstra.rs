//! Single-source shortest paths over follow edges.

use crate::error::GraphError;
use crate::graph::{EdgeKind, Graph};
use kith_core::FeedId;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Distance from the lookup source to a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// Sum of follow weights along the shortest path
    Finite(u64),
    /// No follow path exists, or the feed is not in the graph
    Unreachable,
    /// The source blocks this feed directly
    Blocked,
}

impl Distance {
    /// Finite weight, if any.
    pub fn finite(self) -> Option<u64> {
        match self {
            Distance::Finite(d) => Some(d),
            _ => None,
        }
    }
}

/// Shortest-path result for one source.
#[derive(Debug)]
pub struct Lookup<'g> {
    graph: &'g Graph,
    source: NodeIndex,
    dist: Vec<Option<u64>>,
    prev: Vec<Option<NodeIndex>>,
    blocked: Vec<bool>,
}

impl Graph {
    /// Run Dijkstra from `source`.
    ///
    /// Feeds the source blocks are marked and never relaxed through, so they
    /// neither receive a distance nor serve as intermediaries.
    pub fn make_dijkstra(&self, source: &FeedId) -> Result<Lookup<'_>, GraphError> {
        let start = *self
            .nodes
            .get(source)
            .ok_or(GraphError::NoSuchSource(*source))?;

        let n = self.inner.node_count();
        let mut dist: Vec<Option<u64>> = vec![None; n];
        let mut prev: Vec<Option<NodeIndex>> = vec![None; n];
        let mut blocked = vec![false; n];

        for edge in self.inner.edges(start) {
            if edge.weight().kind == EdgeKind::Block {
                blocked[edge.target().index()] = true;
            }
        }

        let mut heap = BinaryHeap::new();
        dist[start.index()] = Some(0);
        heap.push(Reverse((0u64, start.index())));

        while let Some(Reverse((d, u))) = heap.pop() {
            if dist[u].is_some_and(|best| d > best) {
                continue;
            }
            for edge in self.inner.edges(NodeIndex::new(u)) {
                let weight = edge.weight();
                if weight.kind != EdgeKind::Follow {
                    continue;
                }
                let v = edge.target().index();
                if blocked[v] {
                    continue;
                }
                let candidate = d.saturating_add(weight.weight);
                if dist[v].map_or(true, |best| candidate < best) {
                    dist[v] = Some(candidate);
                    prev[v] = Some(NodeIndex::new(u));
                    heap.push(Reverse((candidate, v)));
                }
            }
        }

        Ok(Lookup {
            graph: self,
            source: start,
            dist,
            prev,
            blocked,
        })
    }
}

impl Lookup<'_> {
    /// Feed the lookup was computed from.
    pub fn source(&self) -> FeedId {
        self.graph.inner[self.source]
    }

    /// Shortest path from the source to `target`, both ends included.
    ///
    /// The path is empty unless the distance is finite.
    pub fn dist(&self, target: &FeedId) -> (Vec<FeedId>, Distance) {
        let Some(&node) = self.graph.nodes.get(target) else {
            return (Vec::new(), Distance::Unreachable);
        };
        if self.blocked[node.index()] {
            return (Vec::new(), Distance::Blocked);
        }
        let Some(d) = self.dist[node.index()] else {
            return (Vec::new(), Distance::Unreachable);
        };

        let mut path = vec![self.graph.inner[node]];
        let mut cursor = node;
        while let Some(p) = self.prev[cursor.index()] {
            path.push(self.graph.inner[p]);
            cursor = p;
        }
        path.reverse();
        (path, Distance::Finite(d))
    }

    /// Feeds with at most `max_hops` intermediaries between the source and
    /// them, sorted. The source itself is excluded.
    pub fn reachable_within(&self, max_hops: u32) -> Vec<FeedId> {
        let limit = u64::from(max_hops) + 1;
        let mut out: Vec<FeedId> = self
            .dist
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.source.index())
            .filter_map(|(i, d)| match d {
                Some(d) if *d <= limit => Some(self.graph.inner[NodeIndex::new(i)]),
                _ => None,
            })
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::ContactState::{Block, Follow, Neutral};
    use assert_matches::assert_matches;

    fn feed(seed: u8) -> FeedId {
        FeedId::from_bytes([seed; 32])
    }

    fn chain() -> Graph {
        // 1 → 2 → 3 → 4
        Graph::from_declarations([
            (feed(1), feed(2), Follow),
            (feed(2), feed(3), Follow),
            (feed(3), feed(4), Follow),
        ])
    }

    #[test]
    fn test_missing_source() {
        let graph = chain();
        assert_matches!(
            graph.make_dijkstra(&feed(9)),
            Err(GraphError::NoSuchSource(f)) if f == feed(9)
        );
    }

    #[test]
    fn test_path_includes_both_ends() {
        let graph = chain();
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(lookup.source(), feed(1));

        let (path, distance) = lookup.dist(&feed(4));
        assert_eq!(path, vec![feed(1), feed(2), feed(3), feed(4)]);
        assert_eq!(distance, Distance::Finite(3));

        let (path, distance) = lookup.dist(&feed(1));
        assert_eq!(path, vec![feed(1)]);
        assert_eq!(distance, Distance::Finite(0));
    }

    #[test]
    fn test_shortest_path_wins() {
        let graph = Graph::from_declarations([
            (feed(1), feed(2), Follow),
            (feed(2), feed(3), Follow),
            (feed(3), feed(4), Follow),
            (feed(1), feed(4), Follow),
        ]);
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(lookup.dist(&feed(4)), (vec![feed(1), feed(4)], Distance::Finite(1)));
    }

    #[test]
    fn test_unreachable_and_unknown() {
        let graph = Graph::from_declarations([
            (feed(1), feed(2), Follow),
            (feed(3), feed(4), Follow),
            (feed(1), feed(5), Neutral),
        ]);
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(lookup.dist(&feed(4)), (vec![], Distance::Unreachable));
        assert_eq!(lookup.dist(&feed(5)), (vec![], Distance::Unreachable));
        assert_eq!(lookup.dist(&feed(42)), (vec![], Distance::Unreachable));
    }

    #[test]
    fn test_direct_block_is_not_traversed() {
        // 1 blocks 2, and 3 follows 2: 2 stays blocked and 4 behind it is cut off.
        let graph = Graph::from_declarations([
            (feed(1), feed(3), Follow),
            (feed(3), feed(2), Follow),
            (feed(2), feed(4), Follow),
            (feed(1), feed(2), Block),
        ]);
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(lookup.dist(&feed(2)), (vec![], Distance::Blocked));
        assert_eq!(lookup.dist(&feed(4)), (vec![], Distance::Unreachable));
    }

    #[test]
    fn test_block_by_other_feed_does_not_propagate() {
        let graph = Graph::from_declarations([
            (feed(1), feed(2), Follow),
            (feed(1), feed(3), Follow),
            (feed(2), feed(4), Block),
            (feed(3), feed(4), Follow),
        ]);
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(
            lookup.dist(&feed(4)),
            (vec![feed(1), feed(3), feed(4)], Distance::Finite(2))
        );
    }

    #[test]
    fn test_reachable_within() {
        let graph = chain();
        let lookup = graph.make_dijkstra(&feed(1)).unwrap();
        assert_eq!(lookup.reachable_within(0), vec![feed(2)]);
        assert_eq!(lookup.reachable_within(1), vec![feed(2), feed(3)]);
        assert_eq!(lookup.reachable_within(5), vec![feed(2), feed(3), feed(4)]);
    }
}
