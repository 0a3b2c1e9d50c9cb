use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AuthResponse, User};
use crate::storage::StorageError;

use super::{Route, TokenStore};

/// Fallback shown when a failed login carries no server message.
const LOGIN_FAILED: &str = "Login failed";

/// Fallback shown when a failed registration carries no server message.
const REGISTRATION_FAILED: &str = "Registration failed";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    LoginFailed(String),

    #[error("{0}")]
    RegistrationFailed(String),

    #[error("Failed to store session: {0}")]
    Storage(#[from] StorageError),
}

/// The in-memory session: who is logged in right now.
///
/// Shared between the API client, which drops it on irrecoverable refresh
/// failures, and the `SessionController`.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    user: Arc<RwLock<Option<User>>>,
}

impl SessionState {
    pub fn user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, user: User) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = Some(user);
    }

    pub fn clear(&self) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Login, registration, logout and session restore.
pub struct SessionController {
    api: ApiClient,
    loading: bool,
}

impl SessionController {
    pub fn new(api: ApiClient) -> Self {
        Self { api, loading: true }
    }

    fn tokens(&self) -> &TokenStore {
        self.api.tokens()
    }

    /// Restore the session cached by a previous run.
    ///
    /// The cached user is trusted as-is; an expired token surfaces later as a
    /// 401 and goes through the refresh sequence.
    pub fn restore(&mut self) -> Option<User> {
        let user = self.tokens().user();
        match user {
            Some(ref user) => {
                info!(user_id = %user.id, "Restored cached session");
                self.api.session().set(user.clone());
            }
            None => self.api.session().clear(),
        }
        self.loading = false;
        user
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.api.login(email, password).await {
            Ok(response) => Ok(self.establish(response)?),
            Err(e) => {
                warn!(error = %e, "Login failed");
                Err(AuthError::LoginFailed(Self::failure_message(&e, LOGIN_FAILED)))
            }
        }
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        match self.api.register(email, password, name).await {
            Ok(response) => Ok(self.establish(response)?),
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Err(AuthError::RegistrationFailed(Self::failure_message(
                    &e,
                    REGISTRATION_FAILED,
                )))
            }
        }
    }

    /// End the session locally. Never contacts the server, so it works offline.
    pub fn logout(&mut self) {
        if let Err(e) = self.tokens().clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.api.session().clear();
        info!("Logged out");
        self.api.navigator().navigate(Route::Login);
    }

    pub fn user(&self) -> Option<User> {
        self.api.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    /// True until `restore` has run.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn establish(&mut self, response: AuthResponse) -> Result<User, StorageError> {
        let AuthResponse {
            access_token,
            refresh_token,
            user,
        } = response;

        self.tokens().save(&access_token, &refresh_token)?;
        self.tokens().save_user(&user)?;
        self.api.session().set(user.clone());
        self.loading = false;

        info!(user_id = %user.id, "Session established");
        self.api.navigator().navigate(Route::Dashboard);
        Ok(user)
    }

    fn failure_message(error: &ApiError, fallback: &str) -> String {
        error.server_message().unwrap_or(fallback).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RecordingNavigator;
    use crate::models::SystemRole;
    use crate::storage::MemoryStore;

    fn controller() -> (SessionController, Arc<RecordingNavigator>) {
        let navigator = Arc::new(RecordingNavigator::new());
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        let api = ApiClient::new("http://localhost:8080/api", tokens, navigator.clone()).unwrap();
        (SessionController::new(api), navigator)
    }

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            system_role: SystemRole::Admin,
            created_at: None,
        }
    }

    #[test]
    fn test_restore_trusts_cached_user() {
        let (mut session, _) = controller();
        assert!(session.is_loading());
        session.api.tokens().save_user(&user()).unwrap();

        assert_eq!(session.restore(), Some(user()));
        assert!(session.is_authenticated());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_restore_without_cache_is_anonymous() {
        let (mut session, _) = controller();
        assert!(session.restore().is_none());
        assert!(!session.is_authenticated());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_logout_clears_and_redirects() {
        let (mut session, navigator) = controller();
        session.api.tokens().save("a", "r").unwrap();
        session.api.tokens().save_user(&user()).unwrap();
        session.restore();

        session.logout();

        assert!(!session.is_authenticated());
        assert!(session.api.tokens().access_token().is_none());
        assert!(session.api.tokens().user().is_none());
        assert_eq!(navigator.last(), Some(Route::Login));
    }

    #[test]
    fn test_failure_message_fallback() {
        let err = ApiError::Unauthorized(Some("Invalid credentials".to_string()));
        assert_eq!(SessionController::failure_message(&err, LOGIN_FAILED), "Invalid credentials");
        let err = ApiError::InvalidResponse("garbage".to_string());
        assert_eq!(SessionController::failure_message(&err, LOGIN_FAILED), LOGIN_FAILED);
    }
}
