//! Hop-limited replication authorization.

use crate::builder::GraphBuilder;
use crate::config::AuthorizerConfig;
use crate::dijkstra::Distance;
use crate::error::{AuthorizeError, GraphError};
use kith_core::FeedId;

/// Decides whether a remote feed may be replicated.
pub trait Authorizer: Send + Sync {
    /// `Ok(())` if `feed` may be replicated.
    fn authorize(&self, feed: &FeedId) -> Result<(), AuthorizeError>;
}

/// Accepts feeds with at most `max_hops` intermediaries between the local
/// feed and them.
///
/// Every call rebuilds the graph, so follow changes take effect on the next
/// decision without any cache invalidation.
#[derive(Debug, Clone)]
pub struct HopAuthorizer<B> {
    builder: B,
    config: AuthorizerConfig,
}

impl<B: GraphBuilder> HopAuthorizer<B> {
    /// Authorizer reading graphs from `builder`.
    pub fn new(builder: B, config: AuthorizerConfig) -> Self {
        Self { builder, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }
}

impl<B: GraphBuilder> Authorizer for HopAuthorizer<B> {
    fn authorize(&self, feed: &FeedId) -> Result<(), AuthorizeError> {
        let me = &self.config.self_feed;
        let max_hops = self.config.max_hops;
        let graph = self.builder.build()?;

        if graph.node_count() == 0 {
            tracing::warn!(event = "authbypass", feed = %feed, "trust on first use");
            return Ok(());
        }

        if graph.follows(me, feed) {
            tracing::debug!(feed = %feed, "followed directly");
            return Ok(());
        }

        let lookup = match graph.make_dijkstra(me) {
            Ok(lookup) => lookup,
            // Local feed not indexed yet, e.g. while resyncing an existing
            // identity.
            Err(GraphError::NoSuchSource(_)) => {
                tracing::debug!(feed = %feed, "local feed not in graph yet");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let (path, distance) = lookup.dist(feed);
        let hops = path.len() as i64 - 2;
        let within = matches!(distance, Distance::Finite(_))
            && (0..=i64::from(max_hops)).contains(&hops);
        if !within {
            tracing::debug!(feed = %feed, hops, ?distance, max_hops, "feed out of reach");
            return Err(AuthorizeError::OutOfReach {
                actual_hops: hops,
                max_hops,
            });
        }

        tracing::debug!(feed = %feed, hops, "feed authorized");
        Ok(())
    }
}
