//! Typed wrappers for the task, project, membership and admin endpoints.
//!
//! All of these go through the authenticated pipeline in `client.rs`.

use crate::models::{
    CreateProjectRequest, CreateTaskRequest, InviteMemberRequest, Project, ProjectMember,
    ProjectRole, Task, TaskStatus, UpdateMemberRoleRequest, UpdateProjectRequest,
    UpdateTaskRequest, User,
};

use super::call::ApiRequest;
use super::{ApiClient, ApiError};

impl ApiClient {
    // ===== Account =====

    /// Fetch the authenticated user as the server currently sees it.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.send_json(ApiRequest::get("/auth/me")).await
    }

    // ===== Tasks =====

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.send_list(ApiRequest::get("/tasks")).await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        self.send_json(ApiRequest::get(format!("/tasks/{}", task_id))).await
    }

    pub async fn create_task(&self, task: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.send_json(ApiRequest::post("/tasks", task)?).await
    }

    pub async fn update_task(&self, task_id: &str, task: &UpdateTaskRequest) -> Result<Task, ApiError> {
        self.send_json(ApiRequest::put(format!("/tasks/{}", task_id), task)?).await
    }

    /// Move a task to `status`, resubmitting the rest of the task unchanged.
    pub async fn set_task_status(&self, task: &Task, status: TaskStatus) -> Result<Task, ApiError> {
        let mut update = UpdateTaskRequest::from(task);
        update.status = status;
        self.update_task(&task.id, &update).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/tasks/{}", task_id))).await
    }

    // ===== Projects =====

    /// Projects visible to the caller (all projects for admins), in server order.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.send_list(ApiRequest::get("/projects")).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Project, ApiError> {
        self.send_json(ApiRequest::get(format!("/projects/{}", project_id))).await
    }

    pub async fn create_project(&self, project: &CreateProjectRequest) -> Result<Project, ApiError> {
        self.send_json(ApiRequest::post("/projects", project)?).await
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        project: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        self.send_json(ApiRequest::put(format!("/projects/{}", project_id), project)?)
            .await
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/projects/{}", project_id)))
            .await
    }

    // ===== Members =====

    pub async fn list_members(&self, project_id: &str) -> Result<Vec<ProjectMember>, ApiError> {
        self.send_list(ApiRequest::get(format!("/projects/{}/members", project_id)))
            .await
    }

    pub async fn invite_member(
        &self,
        project_id: &str,
        email: &str,
        role: ProjectRole,
    ) -> Result<(), ApiError> {
        let body = InviteMemberRequest {
            email: email.trim().to_string(),
            role,
        };
        self.send_empty(ApiRequest::post(format!("/projects/{}/invite", project_id), &body)?)
            .await
    }

    pub async fn update_member_role(
        &self,
        project_id: &str,
        user_id: &str,
        role: ProjectRole,
    ) -> Result<(), ApiError> {
        let body = UpdateMemberRoleRequest { role };
        self.send_empty(ApiRequest::put(
            format!("/projects/{}/members/{}", project_id, user_id),
            &body,
        )?)
        .await
    }

    pub async fn remove_member(&self, project_id: &str, user_id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!(
            "/projects/{}/members/{}",
            project_id, user_id
        )))
        .await
    }

    // ===== Admin =====

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send_list(ApiRequest::get("/admin/users")).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.send_empty(ApiRequest::delete(format!("/admin/users/{}", user_id)))
            .await
    }
}
