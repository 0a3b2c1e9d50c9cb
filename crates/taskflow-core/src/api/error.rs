use std::fmt;

use thiserror::Error;

use crate::models::ErrorResponse;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("token may be expired"))]
    Unauthorized(Option<String>),

    #[error("Access denied: {0}")]
    AccessDenied(ErrorBody),

    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    #[error("Request rejected: {0}")]
    Validation(ErrorBody),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ErrorBody),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Body of a failed response.
///
/// Only the `error` field of a JSON payload is meant for users; any other
/// body (proxy HTML, plain text) is kept for logs and `Display` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    message: Option<String>,
    body: String,
}

impl ErrorBody {
    /// A body carrying a server message.
    pub fn message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            body: message.clone(),
            message: Some(message),
        }
    }

    /// The server's `error` field, if the body had one.
    pub fn server_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or(&self.body))
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Message shown when the session could not be recovered.
const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The `error` field of a JSON error payload, if the body is one.
    fn payload_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .map(|payload| payload.error)
            .filter(|message| !message.trim().is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let payload = Self::payload_message(body);
        let message = ErrorBody {
            body: Self::truncate_body(body),
            message: payload.clone(),
        };
        match status.as_u16() {
            401 => ApiError::Unauthorized(payload),
            403 => ApiError::AccessDenied(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            400..=499 => ApiError::Validation(message),
            500..=599 => ApiError::ServerError(message),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    /// True when the session was torn down and the user must log in again.
    pub fn is_session_lost(&self) -> bool {
        matches!(self, ApiError::SessionExpired | ApiError::RefreshFailed(_))
    }

    /// Message reported by the server, suitable for showing verbatim.
    pub fn server_message(&self) -> Option<&str> {
        let message = match self {
            ApiError::Unauthorized(message) => message.as_deref()?,
            ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::Validation(body)
            | ApiError::ServerError(body) => body.server_message()?,
            _ => return None,
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }

    /// Message for the user: the server's own words when it sent any,
    /// otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_session_lost() {
            return SESSION_EXPIRED_MESSAGE.to_string();
        }
        self.server_message().unwrap_or(fallback).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_payload() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, r#"{"error":"Title is required"}"#);
        assert!(matches!(err, ApiError::Validation(ref b) if b.server_message() == Some("Title is required")));
        assert_eq!(err.user_message("Failed to create task"), "Title is required");
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, r#"{"error":"Access denied"}"#),
            ApiError::AccessDenied(_)
        ));
        assert!(matches!(ApiError::from_status(StatusCode::NOT_FOUND, ""), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>"),
            ApiError::ServerError(_)
        ));
    }

    #[test]
    fn test_unauthorized_keeps_server_message() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid email or password"}"#);
        assert_eq!(err.server_message(), Some("Invalid email or password"));

        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_raw_body_is_not_a_server_message() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Login failed"), "Login failed");
        // Still visible in logs
        assert_eq!(err.to_string(), "Server error: <html>502 Bad Gateway</html>");

        let err = ApiError::from_status(StatusCode::NOT_FOUND, "404 page not found");
        assert_eq!(err.user_message("Failed to load tasks"), "Failed to load tasks");
    }

    #[test]
    fn test_session_lost_message() {
        let err = ApiError::RefreshFailed(Box::new(ApiError::Unauthorized(None)));
        assert!(err.is_session_lost());
        assert_eq!(err.user_message("Failed to load tasks"), SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn test_truncate_body() {
        let body = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
        assert!(ApiError::truncate_body("short") == "short");
    }
}
