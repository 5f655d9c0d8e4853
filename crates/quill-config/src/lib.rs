//! # quill-config
//!
//! Configuration management for Quill.
//!
//! Loads configuration from:
//! 1. `~/.quill/config.toml` (global)
//! 2. `.quill/config.toml` (project-local, overrides global)
//! 3. Environment variables (highest priority)
//!
//! Command-line flags are applied on top by the binary.

pub mod logging;
pub mod path;
pub mod testing;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Log store name used when nothing else is configured.
pub const DEFAULT_LOG_FILE: &str = "terminal_log.log";

/// Project config location, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".quill/config.toml";

pub const ENV_LOG_FILE: &str = "QUILL_LOG_FILE";
pub const ENV_STRICT: &str = "QUILL_STRICT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(#[from] toml::de::Error),
    #[error("TOML render error: {0}")]
    Render(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audit: AuditConfig,
    pub write: WriteConfig,
}

impl Config {
    /// Load config for a process running in `project_root`.
    pub fn load_from(project_root: &Path) -> Result<Self> {
        let global = Self::global_config_path();
        let project = Self::project_config_path(project_root);
        let mut config = Self::load_layers(global.as_deref(), Some(&project))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load and merge config files without consulting the environment.
    ///
    /// Missing files are skipped. Keys present in a later layer replace the
    /// same keys from earlier layers; keys it omits are inherited.
    pub fn load_layers(global: Option<&Path>, project: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();

        for layer in [global, project].into_iter().flatten() {
            if !layer.exists() {
                continue;
            }
            debug!("Loading config from {:?}", layer);
            let contents = std::fs::read_to_string(layer)?;
            let table: toml::Table = contents.parse().map_err(|source| ConfigError::Toml {
                path: layer.to_path_buf(),
                source,
            })?;
            overlay(&mut merged, table);
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    /// Global config path: ~/.quill/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".quill/config.toml"))
    }

    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_CONFIG_PATH)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_LOG_FILE).filter(|p| !p.is_empty()) {
            self.audit.log_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_STRICT) {
            match parse_flag(&raw) {
                Some(strict) => self.write.strict = strict,
                None => warn!("Ignoring {}={:?}: expected a boolean", ENV_STRICT, raw),
            }
        }
    }

    /// Absolute location of the log store for a process running in `cwd`.
    pub fn log_file_in(&self, cwd: &Path) -> PathBuf {
        path::resolve_against(cwd, &self.audit.log_file)
    }

    /// Render this config as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Audit log store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Log store path; relative paths resolve against the working directory
    pub log_file: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

/// Write policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    /// Exit non-zero when a write fails (default keeps exit status 0)
    pub strict: bool,
}

fn overlay(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                overlay(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
