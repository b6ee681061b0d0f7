// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session configuration.
//!
//! Settings are read from a RON file. Every field has a default, so a missing
//! file or a partial one is fine:
//!
//! ```ron
//! (
//!     watch: true,
//!     debounce_ms: 500,
//!     auto_wire: true,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when none is given
pub const CONFIG_FILE_NAME: &str = "modelflow.ron";

/// Errors loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read
    #[error("Failed to read config {path:?}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid RON for [`SessionConfig`]
    #[error("Invalid config {path:?}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: ron::error::SpannedError,
    },
}

/// Settings for an interactive session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Re-ingest loaded files when they change on disk
    pub watch: bool,
    /// Debounce window for file change events, in milliseconds
    pub debounce_ms: u64,
    /// Extensions that count as spreadsheets for the watcher
    pub extensions: Vec<String>,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Wire same-named variables between each newly loaded model and the
    /// open ports of existing models, in both directions
    pub auto_wire: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watch: false,
            debounce_ms: 250,
            extensions: modelflow_ingest::SUPPORTED_EXTENSIONS
                .iter()
                .map(|e| (*e).to_string())
                .collect(),
            log_filter: "warn,modelflow_app=info".to_string(),
            auto_wire: false,
        }
    }
}

impl SessionConfig {
    /// Parse a config from RON text
    pub fn from_ron(text: &str, path: &Path) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, or from [`CONFIG_FILE_NAME`] if present
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE_NAME), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_ron(&text, &path),
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io { path, source }),
        }
    }

    /// Debounce window as a duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
