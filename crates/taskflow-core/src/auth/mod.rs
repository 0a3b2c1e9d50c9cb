//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `TokenStore`: access/refresh tokens and the cached user in local storage
//! - `SessionState`: the in-memory session shared with the API client
//! - `SessionController`: login, registration, logout and restore
//! - `Navigator`: where the session layer sends the user on boundaries
//!
//! Sessions are restored optimistically from the cached user; the API client's
//! 401 handling is what actually enforces expiry.

pub mod navigator;
pub mod session;
pub mod tokens;

pub use navigator::{LogNavigator, Navigator, RecordingNavigator, Route};
pub use session::{AuthError, SessionController, SessionState};
pub use tokens::TokenStore;
