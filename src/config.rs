//! Configuration System
//!
//! Repository configuration loaded from `{state root}/config.toml`. Every
//! field has a default, so a missing file means a fully default
//! configuration rather than an error.

use crate::error::RepoError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeelConfig {
    /// Branch created by `init` and used when no branch is named.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for KeelConfig {
    fn default() -> Self {
        Self {
            default_branch: default_branch(),
            logging: LoggingConfig::default(),
        }
    }
}

impl KeelConfig {
    /// Load configuration for a repository state root, falling back to
    /// defaults when no config file exists.
    pub fn load(state_root: &Path) -> Result<Self, RepoError> {
        let path = state_root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, RepoError> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| RepoError::Config(format!("failed to parse {:?}: {}", path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = KeelConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_branch, "master");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "default_branch = \"trunk\"\n",
        )
        .unwrap();

        let config = KeelConfig::load(dir.path()).unwrap();
        assert_eq!(config.default_branch, "trunk");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "default_branch = [").unwrap();
        assert!(KeelConfig::load(dir.path()).is_err());
    }
}
