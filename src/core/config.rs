//! Engine configuration.
//!
//! All fields have defaults; a TOML file only needs the keys it changes:
//!
//! ```toml
//! storage_path = "league-night.json"
//! max_undo_depth = 200
//! log_filter = "bowling_engine=debug"
//! ```

use std::path::{Path, PathBuf};

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the JSON store lives. `None` leaves the choice to the caller.
    pub storage_path: Option<PathBuf>,

    /// Seed for id generation. Same seed produces the same ids.
    pub id_seed: Option<u64>,

    /// Maximum snapshots kept per game (`None` = unbounded).
    /// The oldest snapshot is discarded first.
    pub max_undo_depth: Option<usize>,

    /// `tracing` filter directive used by the CLI when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            id_seed: None,
            max_undo_depth: None,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse { source })
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the store location.
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    /// Set the id seed.
    pub fn with_id_seed(mut self, seed: u64) -> Self {
        self.id_seed = Some(seed);
        self
    }

    /// Cap the undo history.
    pub fn with_max_undo_depth(mut self, depth: usize) -> Self {
        self.max_undo_depth = Some(depth);
        self
    }

    /// Set the log filter.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

/// Failure to load an `EngineConfig`.
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[display("failed to read config {}: {}", path.display(), source)]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[display("invalid config: {}", source)]
    Parse {
        /// Underlying parse error.
        source: toml::de::Error,
    },
}
