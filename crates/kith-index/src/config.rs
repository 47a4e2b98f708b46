//! Repository configuration.

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the node keeps its derived indexes.
///
/// ```toml
/// base_path = "/var/lib/kith"
/// create_dirs = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Root directory; indexes live under `indexes/` and `sublogs/`
    pub base_path: PathBuf,
    /// Create missing directories instead of failing
    #[serde(default = "default_create_dirs")]
    pub create_dirs: bool,
}

fn default_create_dirs() -> bool {
    true
}

impl RepoConfig {
    /// Config rooted at `base_path` with default options.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            create_dirs: default_create_dirs(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, IndexError> {
        toml::from_str(s).map_err(|e| IndexError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = RepoConfig::from_toml_str(r#"base_path = "/tmp/kith""#).unwrap();
        assert_eq!(config, RepoConfig::new("/tmp/kith"));
    }

    #[test]
    fn test_missing_base_path_is_config_error() {
        let err = RepoConfig::from_toml_str("create_dirs = false").unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
    }
}
