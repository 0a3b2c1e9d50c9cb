use std::sync::Arc;

use tracing::warn;

use crate::models::User;
use crate::storage::{KeyValueStore, StorageError, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};

/// Access/refresh tokens and the cached user record, kept in key-value storage.
///
/// Tokens are opaque strings and are stored as given.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStore>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Underlying storage, shared with other persisted client state.
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn save(&self, access_token: &str, refresh_token: &str) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, refresh_token)
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(REFRESH_TOKEN_KEY)
    }

    /// Remove both tokens and the cached user.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(ACCESS_TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        self.storage.remove(USER_KEY)
    }

    pub fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let json = serde_json::to_string(user)?;
        self.storage.set(USER_KEY, &json)
    }

    /// The cached user. A record that no longer decodes reads as absent.
    pub fn user(&self) -> Option<User> {
        let json = self.storage.get(USER_KEY)?;
        match serde_json::from_str(&json) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached user");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}
