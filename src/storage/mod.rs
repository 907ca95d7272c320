//! Persistence gateway.
//!
//! The engine keeps the authoritative copy of every game in memory and
//! hands a full `StorageSchema` to a `StorageGateway` after each committed
//! mutation. A failed save never undoes the mutation; it is logged and
//! returned to the caller as a warning.
//!
//! ## Implementations
//!
//! - [`JsonFileStore`]: one JSON document on disk
//! - [`MemoryStore`]: in-process, with switchable failures for tests

mod json_file;
mod memory;
mod migrate;
mod schema;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use schema::{StorageSchema, CURRENT_VERSION, LEGACY_VERSION};

use derive_more::{Display, Error};

/// Persistence failure with location tracking.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StorageError {
    /// Error message.
    pub message: String,
    /// Line number where the error was raised.
    pub line: u32,
    /// Source file where the error was raised.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a storage error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for StorageError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StorageError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {}", err))
    }
}

/// Durable store for the game collection and the active-game pointer.
pub trait StorageGateway {
    /// Read everything that was stored. An empty store loads as
    /// `StorageSchema::default()`.
    fn load(&self) -> Result<StorageSchema, StorageError>;

    /// Replace the stored collection with `schema`.
    fn save(&mut self, schema: &StorageSchema) -> Result<(), StorageError>;
}

impl<S: StorageGateway + ?Sized> StorageGateway for Box<S> {
    fn load(&self) -> Result<StorageSchema, StorageError> {
        (**self).load()
    }

    fn save(&mut self, schema: &StorageSchema) -> Result<(), StorageError> {
        (**self).save(schema)
    }
}
