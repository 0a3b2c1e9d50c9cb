//! REST API client module for the TaskFlow service.
//!
//! This module provides the `ApiClient` for communicating with the TaskFlow
//! API: authentication, tasks, projects, membership and the admin panel.
//!
//! The API uses bearer token authentication. Access tokens are renewed with
//! the refresh token when the server answers 401, at most once per call.

pub mod call;
pub mod client;
pub mod error;
mod resources;

pub use call::CallState;
pub use client::ApiClient;
pub use error::{ApiError, ErrorBody};
