//! Key-value persistence for the vault core.
//!
//! Everything the core stores (the session pointer, the credential
//! registry, each principal's password entries, folder names, and theme
//! preference) goes through the [`KeyValueStore`] trait as a JSON document
//! under a namespaced string key. Two adapters ship with the crate:
//!
//! - [`FileStore`]: one JSON file per key in an app data directory
//! - [`MemoryStore`]: in-process map, used in tests and as a scratch store

pub mod file;
pub mod keys;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors surfaced by a storage adapter.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An I/O error occurred (file access, permissions, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store rejected the operation.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Asynchronous key → string document store.
///
/// The contract mirrors an on-device preference store: reads return `None`
/// for absent keys, writes replace the whole value, and deletes are
/// idempotent. Callers treat every method as a suspension point.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove the value stored under `key`. Absent keys are not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;
}
