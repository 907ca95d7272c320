//! Single-document JSON store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::{StorageError, StorageGateway, StorageSchema};

/// Stores the whole collection as one pretty-printed JSON file.
///
/// Saves write a sibling temporary file and rename it over the target, so
/// a crash mid-write leaves the previous document intact.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. Nothing is touched until the first load or
    /// save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageGateway for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<StorageSchema, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no stored games yet");
                return Ok(StorageSchema::default());
            }
            Err(err) => return Err(err.into()),
        };

        if text.trim().is_empty() {
            return Ok(StorageSchema::default());
        }
        StorageSchema::from_json_str(&text)
    }

    #[instrument(skip(self, schema), fields(path = %self.path.display(), games = schema.games.len()))]
    fn save(&mut self, schema: &StorageSchema) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let text = serde_json::to_string_pretty(schema)?;
        let temp = self.temp_path();
        fs::write(&temp, text)?;
        fs::rename(&temp, &self.path)?;

        debug!("games saved");
        Ok(())
    }
}
