//! Application state management for TaskFlow.
//!
//! This module contains the `App` struct that ties the client together: the
//! configuration, the API client, the session, the project selection, the
//! dashboard task list and pending toast notifications. One `App` lives for
//! the whole run of a front end and is passed by reference to whatever
//! handles user actions.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{AuthError, Navigator, SessionController, TokenStore};
use crate::config::Config;
use crate::models::{CreateTaskRequest, Task, TaskFilter, TaskStatus, UpdateTaskRequest, User};
use crate::notifications::Toasts;
use crate::projects::ProjectContext;
use crate::storage::{FileStore, KeyValueStore};

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: SessionController,
    pub projects: ProjectContext,
    pub toasts: Toasts,
    pub tasks: Vec<Task>,
    pub task_filter: TaskFilter,
}

impl App {
    /// Build the client on top of `storage`.
    pub fn new(
        config: Config,
        storage: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let tokens = TokenStore::new(storage);
        let api = ApiClient::new(config.api_url(), tokens, navigator)?;

        Ok(Self {
            config,
            session: SessionController::new(api.clone()),
            projects: ProjectContext::new(api.clone()),
            api,
            toasts: Toasts::new(),
            tasks: Vec::new(),
            task_filter: TaskFilter::All,
        })
    }

    /// Build the client with state persisted in the configured data directory.
    pub fn open(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let path = config.storage_path()?;
        let storage = Arc::new(FileStore::open(path));
        Self::new(config, storage, navigator).context("Failed to create API client")
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.session.login(email, password).await?;
        self.load_projects().await;
        Ok(user)
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let user = self.session.register(email, password, name).await?;
        self.load_projects().await;
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.clear_user_data();
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Advisory: whether to offer the admin panel.
    pub fn can_access_admin(&self) -> bool {
        self.session.user().map(|u| u.is_admin()).unwrap_or(false)
    }

    /// Reload projects; failures become an error toast.
    pub async fn load_projects(&mut self) -> bool {
        match self.projects.load_projects().await {
            Ok(()) => true,
            Err(e) => {
                self.report(&e, "Failed to load projects");
                false
            }
        }
    }

    // ===== Tasks =====

    pub async fn refresh_tasks(&mut self) -> bool {
        match self.api.list_tasks().await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Tasks loaded");
                self.tasks = tasks;
                true
            }
            Err(e) => {
                self.report(&e, "Failed to load tasks");
                false
            }
        }
    }

    /// Tasks for the selected dashboard tab, in server order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.task_filter.apply(&self.tasks)
    }

    /// Create a task, filing it under the selected project unless one is given.
    pub async fn create_task(&mut self, mut task: CreateTaskRequest) -> Result<Task, ApiError> {
        if task.project_id.is_none() {
            task.project_id = self.projects.current_project().map(|p| p.id.clone());
        }
        let created = self.api.create_task(&task).await.inspect_err(|e| {
            self.report(e, "Failed to create task");
        })?;
        self.toasts.success("Task created successfully!");
        self.refresh_tasks().await;
        Ok(created)
    }

    pub async fn update_task(&mut self, task_id: &str, update: &UpdateTaskRequest) -> Result<Task, ApiError> {
        let updated = self.api.update_task(task_id, update).await.inspect_err(|e| {
            self.report(e, "Failed to update task");
        })?;
        self.toasts.success("Task updated successfully!");
        self.refresh_tasks().await;
        Ok(updated)
    }

    pub async fn change_task_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), ApiError> {
        let cached = self.tasks.iter().find(|t| t.id == task_id).cloned();
        let task = match cached {
            Some(task) => task,
            None => self.api.get_task(task_id).await.inspect_err(|e| {
                self.report(e, "Failed to update task status");
            })?,
        };
        self.api.set_task_status(&task, status).await.inspect_err(|e| {
            self.report(e, "Failed to update task status");
        })?;
        self.toasts.success("Task status updated!");
        self.refresh_tasks().await;
        Ok(())
    }

    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), ApiError> {
        self.api.delete_task(task_id).await.inspect_err(|e| {
            self.report(e, "Failed to delete task");
        })?;
        self.toasts.success("Task deleted successfully!");
        self.refresh_tasks().await;
        Ok(())
    }

    // ===== Error reporting =====

    /// Turn a failed call into a toast. A lost session also drops everything
    /// loaded on behalf of the user.
    pub fn report(&mut self, error: &ApiError, fallback: &str) {
        if error.is_session_lost() {
            info!("Session lost, clearing user data");
            self.clear_user_data();
        } else {
            warn!(error = %error, "{}", fallback);
        }
        self.toasts.error_from(error, fallback);
    }

    fn clear_user_data(&mut self) {
        self.projects.reset();
        self.tasks.clear();
        self.task_filter = TaskFilter::All;
    }
}
