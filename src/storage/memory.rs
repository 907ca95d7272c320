//! In-process store.

use serde_json::Value;

use super::{StorageError, StorageGateway, StorageSchema};

/// Keeps the stored document as raw JSON in memory.
///
/// Loads go through the same decoding and migration as the file store.
/// Either direction can be switched to fail, for exercising the engine's
/// degraded paths.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    document: Option<Value>,
    fail_loads: bool,
    fail_saves: bool,
    saves: usize,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with a raw document, in any stored layout.
    #[must_use]
    pub fn from_json(document: Value) -> Self {
        Self {
            document: Some(document),
            ..Self::default()
        }
    }

    /// Make every subsequent load fail.
    pub fn fail_loads(&mut self, fail: bool) {
        self.fail_loads = fail;
    }

    /// Make every subsequent save fail.
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Last saved document.
    #[must_use]
    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }
}

impl StorageGateway for MemoryStore {
    fn load(&self) -> Result<StorageSchema, StorageError> {
        if self.fail_loads {
            return Err(StorageError::new("load disabled"));
        }
        Ok(self
            .document
            .clone()
            .map(StorageSchema::from_json_value)
            .unwrap_or_default())
    }

    fn save(&mut self, schema: &StorageSchema) -> Result<(), StorageError> {
        if self.fail_saves {
            return Err(StorageError::new("save disabled"));
        }
        self.document = Some(serde_json::to_value(schema)?);
        self.saves += 1;
        Ok(())
    }
}
