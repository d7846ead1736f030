//! Policy configuration loading.
//!
//! The policy file is JSON (`toolgate.json` by convention) and supplies
//! the `allowedDirectories` array consumed by the allow list, plus the
//! optional path-validation time budget. A missing file falls back to
//! compiled-in defaults; a malformed file is an error and is never
//! silently ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Default time budget for a single path validation, in milliseconds.
pub const DEFAULT_VALIDATION_TIMEOUT_MS: u64 = 10_000;

/// Environment variable consulted when no config path is given.
pub const CONFIG_ENV_VAR: &str = "TOOLGATE_CONFIG";

/// Deserialized policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyConfig {
    /// Directories filesystem tools may operate under.
    pub allowed_directories: Vec<PathBuf>,
    /// Path validation budget override, in milliseconds.
    pub validation_timeout_ms: Option<u64>,
}

impl PolicyConfig {
    /// Load a policy config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse policy config {}", path.display()))
    }

    /// Load the config from an explicit path, the `TOOLGATE_CONFIG`
    /// environment variable, or fall back to defaults when neither names
    /// a file. A named file that does not exist also falls back to
    /// defaults; a file that exists but cannot be read or parsed is an
    /// error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
        };
        match resolved {
            Some(p) if p.exists() => Self::load(&p),
            Some(p) => {
                debug!("Policy config {} not found, using defaults", p.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// The validation budget as a [`Duration`].
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(
            self.validation_timeout_ms
                .unwrap_or(DEFAULT_VALIDATION_TIMEOUT_MS),
        )
    }
}
