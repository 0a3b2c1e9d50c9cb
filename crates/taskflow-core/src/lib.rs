//! TaskFlow client core.
//!
//! A client for the TaskFlow task and project management API:
//! - `storage`: persistent key-value state (tokens, cached user, selection)
//! - `auth`: token store, in-memory session, login/logout
//! - `api`: HTTP client with single refresh-and-retry on 401
//! - `projects`: active project selection
//! - `notifications`: toast queue for user-facing messages
//! - `app`: the context object bundling all of the above

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod notifications;
pub mod projects;
pub mod storage;

pub use api::{ApiClient, ApiError};
pub use app::App;
pub use auth::{AuthError, Navigator, Route, SessionController, TokenStore};
pub use config::Config;
pub use projects::ProjectContext;
