//! Feed identifiers
//!
//! A feed is named by the ed25519 public key that signs it. The textual form
//! is `@<base64>.ed25519`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sigil that prefixes every textual feed reference.
pub const FEED_SIGIL: char = '@';
/// Algorithm suffix of a textual feed reference.
pub const FEED_ALGO_SUFFIX: &str = ".ed25519";

/// Errors from parsing a textual feed reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedIdError {
    /// The reference does not start with `@`.
    #[error("feed reference must start with '{FEED_SIGIL}'")]
    MissingSigil,

    /// The reference does not end with a known algorithm suffix.
    #[error("unsupported feed algorithm in {0:?}")]
    UnsupportedAlgorithm(String),

    /// The key part is not valid base64.
    #[error("invalid base64 in feed reference: {0}")]
    InvalidEncoding(String),

    /// The decoded key has the wrong size.
    #[error("feed key must be 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Identity of a feed: an ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedId([u8; 32]);

impl FeedId {
    /// Size of the key in bytes.
    pub const LEN: usize = 32;

    /// Create a feed identifier from raw public key bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Create a feed identifier from a byte slice.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, FeedIdError> {
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| FeedIdError::InvalidLength(bytes.len()))?;
        Ok(Self(key))
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{FEED_SIGIL}{}{FEED_ALGO_SUFFIX}", STANDARD.encode(self.0))
    }
}

impl fmt::Debug for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps graph dumps readable.
        let encoded = STANDARD.encode(self.0);
        write!(f, "FeedId({FEED_SIGIL}{}..)", &encoded[..8])
    }
}

impl FromStr for FeedId {
    type Err = FeedIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix(FEED_SIGIL).ok_or(FeedIdError::MissingSigil)?;
        let key = rest
            .strip_suffix(FEED_ALGO_SUFFIX)
            .ok_or_else(|| FeedIdError::UnsupportedAlgorithm(s.to_string()))?;
        let bytes = STANDARD
            .decode(key)
            .map_err(|e| FeedIdError::InvalidEncoding(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }
}

impl Serialize for FeedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_identity() {
        let feed = FeedId::from_bytes([7u8; 32]);
        let text = feed.to_string();
        assert!(text.starts_with('@'));
        assert!(text.ends_with(".ed25519"));
        assert_eq!(text.parse::<FeedId>().unwrap(), feed);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            "AAAA.ed25519".parse::<FeedId>(),
            Err(FeedIdError::MissingSigil)
        );
        assert!(matches!(
            "@AAAA.sha256".parse::<FeedId>(),
            Err(FeedIdError::UnsupportedAlgorithm(_))
        ));
        assert!(matches!(
            "@!!!.ed25519".parse::<FeedId>(),
            Err(FeedIdError::InvalidEncoding(_))
        ));
        assert_eq!(
            "@AAAA.ed25519".parse::<FeedId>(),
            Err(FeedIdError::InvalidLength(3))
        );
    }

    #[test]
    fn test_ordering_is_by_key_bytes() {
        let low = FeedId::from_bytes([1u8; 32]);
        let high = FeedId::from_bytes([2u8; 32]);
        assert!(low < high);
    }
}
