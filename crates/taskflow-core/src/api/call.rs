//! Per-call request description and retry state.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::ApiError;

/// Lifecycle of one logical API call.
///
/// A call is dispatched at most twice: once normally and once more after a
/// successful token refresh. Only a 401 observed in `Sent` triggers the
/// refresh; a 401 in `RetriedOnce` is returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Unsent,
    Sent,
    RetriedOnce,
    Done,
}

impl CallState {
    /// State after the request has been put on the wire.
    pub fn dispatched(self) -> Self {
        match self {
            CallState::Unsent => CallState::Sent,
            CallState::Sent => CallState::RetriedOnce,
            other => other,
        }
    }

    /// Whether a response with `status` should start refresh-and-retry.
    pub fn should_refresh(self, status: StatusCode) -> bool {
        self == CallState::Sent && status == StatusCode::UNAUTHORIZED
    }

    pub fn finish(self) -> Self {
        CallState::Done
    }
}

/// An API request that can be dispatched more than once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::POST, path).json(body)
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::PUT, path).json(body)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to encode request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }
}
