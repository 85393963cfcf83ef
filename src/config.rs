//! Configuration loading and management
//!
//! Handles parsing of `.taskflow.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

pub const CONFIG_FILENAME: &str = ".taskflow.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Actor configuration
    #[serde(default)]
    pub actor: ActorConfig,

    /// Workspace data configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Task defaults
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor: ActorConfig::default(),
            data: DataConfig::default(),
            tasks: TasksConfig::default(),
        }
    }
}

/// Actor-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Default actor name when none specified
    #[serde(default = "default_actor")]
    pub default: String,
}

fn default_actor() -> String {
    "unknown".to_string()
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            default: default_actor(),
        }
    }
}

/// Workspace data file location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the workspace JSON document, relative to the workspace root
    #[serde(default = "default_data_path")]
    pub path: String,
}

fn default_data_path() -> String {
    ".taskflow/workspace.json".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

/// Task defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Priority assigned when a draft does not carry one
    #[serde(default = "default_priority")]
    pub default_priority: String,

    /// Space selected when none is given on the command line
    #[serde(default = "default_space")]
    pub default_space: String,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_space() -> String {
    "Everything".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            default_space: default_space(),
        }
    }
}

impl Config {
    /// Load configuration from `.taskflow.toml` in the given directory.
    /// Missing or unreadable files fall back to defaults; a present but
    /// invalid file is logged and also falls back.
    pub fn load_from_dir(dir: &Path) -> Config {
        let path = dir.join(CONFIG_FILENAME);
        match Self::load_from_path(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Config::default()
            }
        }
    }

    /// Load configuration from an explicit path. `Ok(None)` when the file
    /// does not exist.
    pub fn load_from_path(path: &Path) -> Result<Option<Config>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(Some(config))
    }

    /// Resolve the workspace data file path against a root directory.
    pub fn data_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.data.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.actor.default, "unknown");
        assert_eq!(config.data.path, ".taskflow/workspace.json");
        assert_eq!(config.tasks.default_space, "Everything");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILENAME),
            "[actor]\ndefault = \"emp-1\"\n",
        )
        .expect("write config");
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.actor.default, "emp-1");
        assert_eq!(config.tasks.default_priority, "medium");
    }

    #[test]
    fn invalid_file_falls_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILENAME), "actor = [broken").expect("write");
        let config = Config::load_from_dir(dir.path());
        assert_eq!(config.actor.default, "unknown");
    }
}
