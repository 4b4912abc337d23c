//! Key-value storage abstraction for persistence.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for durable key-value storage backends.
///
/// Values are JSON-encoded strings. Implementations can store them in
/// memory, on the filesystem, or in a browser's local storage. Failures are
/// expected to be caught at each call site and degraded to in-memory-only
/// state; nothing in the editor treats a storage error as fatal.
pub trait Storage: Send {
    /// Read a value. `Ok(None)` when the key has never been written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// List all stored keys.
    fn keys(&self) -> StorageResult<Vec<String>>;
}
