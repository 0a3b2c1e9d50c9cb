//! Active project selection.
//!
//! The selected project id is persisted under `current_project_id`,
//! independently of the session, and re-applied whenever the project list
//! is reloaded.

pub mod context;

pub use context::ProjectContext;
