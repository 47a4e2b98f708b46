//! Authorizer configuration.

use kith_core::FeedId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hop limit used when none is configured.
pub const DEFAULT_MAX_HOPS: u32 = 2;

/// Invalid authorizer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or misses required fields.
    #[error("failed to parse authorizer config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings of a [`HopAuthorizer`](crate::HopAuthorizer).
///
/// ```toml
/// self_feed = "@AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=.ed25519"
/// max_hops = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizerConfig {
    /// The local feed; distances are measured from here
    pub self_feed: FeedId,
    /// Maximum number of intermediaries between the local feed and a target
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,
}

fn default_max_hops() -> u32 {
    DEFAULT_MAX_HOPS
}

impl AuthorizerConfig {
    /// Config for `self_feed` with the default hop limit.
    pub fn new(self_feed: FeedId) -> Self {
        Self {
            self_feed,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    /// Override the hop limit.
    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
