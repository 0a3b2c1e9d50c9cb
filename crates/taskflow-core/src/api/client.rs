//! API client for communicating with the TaskFlow REST API.
//!
//! This module provides the `ApiClient` struct. Every request goes through
//! `execute`, which attaches the stored bearer token and, on a 401, refreshes
//! the session and resubmits the request exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::{Navigator, Route, SessionState, TokenStore};
use crate::models::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair};

use super::call::{ApiRequest, CallState};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/auth/login";
const REGISTER_PATH: &str = "/auth/register";
const REFRESH_PATH: &str = "/auth/refresh";

/// API client for TaskFlow.
/// Clone is cheap - the HTTP client, token store and session state are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: TokenStore,
    session: SessionState,
    navigator: Arc<dyn Navigator>,
    /// Serializes refreshes so concurrent 401s trigger one refresh call.
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    pub fn new(
        base_url: impl Into<String>,
        tokens: TokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            session: SessionState::default(),
            navigator,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// In-memory session shared with the session controller.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ===== Authentication =====

    /// Exchange credentials for a session. Does not touch stored state.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH, &LoginRequest { email, password })?;
        self.send_public(&request).await
    }

    /// Create an account and return its first session. Does not touch stored state.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = ApiRequest::post(
            REGISTER_PATH,
            &RegisterRequest {
                email,
                password,
                name,
            },
        )?;
        self.send_public(&request).await
    }

    async fn request_token_refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(REFRESH_PATH, &RefreshRequest { refresh_token })?;
        self.send_public(&request).await
    }

    /// Send without credentials and without the refresh sequence. A 401 from
    /// the auth endpoints means bad credentials, not an expired session.
    async fn send_public<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let response = self.dispatch(request, None).await?;
        let response = Self::check_response(response).await?;
        Self::decode(request, response).await
    }

    // ===== Request pipeline =====

    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = bearer.is_some(),
            "Sending request"
        );
        Ok(builder.send().await?)
    }

    /// Send an authenticated request, refreshing the session once on 401.
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut state = CallState::Unsent;
        let mut bearer = self.tokens.access_token();

        loop {
            let response = self.dispatch(request, bearer.as_deref()).await?;
            state = state.dispatched();

            if state.should_refresh(response.status()) {
                debug!(path = %request.path, "Received 401, refreshing session");
                bearer = Some(self.refresh_session(bearer.as_deref()).await?);
                continue;
            }

            let state = state.finish();
            debug!(path = %request.path, status = %response.status(), ?state, "Request complete");
            return Self::check_response(response).await;
        }
    }

    /// Obtain a fresh access token after `rejected` was refused.
    ///
    /// If another call replaced the token while this one waited for the lock,
    /// the stored token is reused without a second refresh call. If another
    /// call already ended the session, this one fails without ending it again.
    async fn refresh_session(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        match self.tokens.access_token() {
            Some(current) if Some(current.as_str()) != rejected => {
                debug!("Access token already refreshed by another request");
                return Ok(current);
            }
            // Another request already tore the session down
            None if rejected.is_some() => return Err(ApiError::SessionExpired),
            _ => {}
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            self.end_session("no refresh token stored");
            return Err(ApiError::SessionExpired);
        };

        match self.request_token_refresh(&refresh_token).await {
            Ok(pair) => {
                if let Err(e) = self.tokens.save(&pair.access_token, &pair.refresh_token) {
                    warn!(error = %e, "Failed to store refreshed tokens");
                    self.end_session("refreshed tokens not stored");
                    return Err(ApiError::RefreshFailed(Box::new(e.into())));
                }
                info!("Session refreshed");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.end_session("refresh rejected");
                Err(ApiError::RefreshFailed(Box::new(e)))
            }
        }
    }

    /// Irrecoverable session failure: wipe all stored state, drop the
    /// in-memory session and send the user to the login screen.
    fn end_session(&self, reason: &str) {
        warn!(reason, "Ending session");
        if let Err(e) = self.tokens.storage().clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.session.clear();
        self.navigator.navigate(Route::Login);
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn decode<T: DeserializeOwned>(request: &ApiRequest, response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse JSON response from {}: {}",
                request.path, e
            ))
        })
    }

    // ===== Typed helpers for resource endpoints =====

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(&request).await?;
        Self::decode(&request, response).await
    }

    /// Fetch a list. The server encodes an empty list as `null`.
    pub(crate) async fn send_list<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Vec<T>, ApiError> {
        let list: Option<Vec<T>> = self.send_json(request).await?;
        Ok(list.unwrap_or_default())
    }

    /// Send a request whose response body is ignored (204s and `{"message": ...}` acks).
    pub(crate) async fn send_empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        let response = self.execute(&request).await?;
        if response.status() != StatusCode::NO_CONTENT {
            debug!(path = %request.path, status = %response.status(), "Ignoring response body");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RecordingNavigator;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        ApiClient::new(base, tokens, Arc::new(RecordingNavigator::new())).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = client("http://localhost:8080/api/");
        assert_eq!(api.base_url(), "http://localhost:8080/api");
        assert_eq!(api.url("/tasks"), "http://localhost:8080/api/tasks");
    }

    #[test]
    fn test_end_session_clears_everything() {
        let api = client("http://localhost:8080/api");
        api.tokens().save("a", "r").unwrap();
        api.tokens().storage().set("current_project_id", "p-1").unwrap();

        api.end_session("test");

        assert!(api.tokens().access_token().is_none());
        assert!(api.tokens().storage().get("current_project_id").is_none());
        assert!(!api.session().is_authenticated());
    }
}
