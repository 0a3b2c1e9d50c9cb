//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use taskflow_core::api::ApiClient;
use taskflow_core::auth::{RecordingNavigator, TokenStore};
use taskflow_core::models::{SystemRole, User};
use taskflow_core::storage::MemoryStore;
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub api: ApiClient,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let api = ApiClient::new(
            format!("{}/api", server.uri()),
            TokenStore::new(store.clone()),
            navigator.clone(),
        )
        .expect("api client");

        Self {
            server,
            store,
            navigator,
            api,
        }
    }

    /// Store tokens and a cached user, as a previous login would have.
    pub fn sign_in(&self, access: &str, refresh: &str) {
        let tokens = self.api.tokens();
        tokens.save(access, refresh).unwrap();
        tokens.save_user(&user()).unwrap();
        self.api.session().set(user());
    }
}

pub fn user() -> User {
    User {
        id: "u-1".to_string(),
        email: "ada@example.com".to_string(),
        name: "Ada Lovelace".to_string(),
        system_role: SystemRole::User,
        created_at: None,
    }
}

pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "system_role": "user",
        "created_at": "2024-01-15T09:00:00Z"
    })
}

pub fn project_json(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Project {}", id),
        "description": "",
        "created_at": "2024-02-01T12:00:00Z",
        "updated_at": null
    })
}

pub fn task_json(id: &str, status: &str) -> Value {
    json!({
        "id": id,
        "project_id": "p-1",
        "user_id": "u-1",
        "title": format!("Task {}", id),
        "description": "",
        "status": status,
        "priority": "medium",
        "due_date": null,
        "created_at": "2024-02-02T12:00:00Z",
        "updated_at": null
    })
}
