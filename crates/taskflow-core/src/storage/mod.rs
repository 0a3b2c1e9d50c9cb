//! Persistent key-value storage for client-side state.
//!
//! This module provides the `KeyValueStore` trait, an origin-scoped string
//! store holding the session tokens, the cached user record and the active
//! project selection. Two backends are provided:
//! - `FileStore`: JSON file on disk, loaded once and written through
//! - `MemoryStore`: process-local map for ephemeral sessions and tests

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key holding the cached user record as JSON.
pub const USER_KEY: &str = "user";

/// Key holding the id of the selected project.
pub const CURRENT_PROJECT_KEY: &str = "current_project_id";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Synchronous string storage scoped to one client installation.
///
/// Reads never fail; a missing or unreadable entry reads as `None`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Remove every key, including ones this crate did not write.
    fn clear(&self) -> Result<(), StorageError>;
}
