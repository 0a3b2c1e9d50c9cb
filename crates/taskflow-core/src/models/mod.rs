//! Data models for TaskFlow entities.
//!
//! - `User`, `SystemRole`: authenticated identity and admin flag
//! - `Task`, `TaskStatus`, `TaskPriority`, `TaskFilter`: dashboard tasks
//! - `Project`, `ProjectMember`, `ProjectRole`: projects and membership
//! - Auth payloads: `AuthResponse`, `TokenPair`, `ErrorResponse`

pub mod auth;
pub mod project;
pub mod task;
pub mod user;

pub use auth::{AuthResponse, ErrorResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPair};
pub use project::{
    CreateProjectRequest, InviteMemberRequest, Project, ProjectMember, ProjectRole,
    UpdateMemberRoleRequest, UpdateProjectRequest,
};
pub use task::{CreateTaskRequest, Task, TaskFilter, TaskPriority, TaskStatus, UpdateTaskRequest};
pub use user::{SystemRole, User};
