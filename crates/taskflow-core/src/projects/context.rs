use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::Project;
use crate::storage::{KeyValueStore, StorageError, CURRENT_PROJECT_KEY};

/// Visible projects and the one currently selected.
pub struct ProjectContext {
    api: ApiClient,
    storage: Arc<dyn KeyValueStore>,
    projects: Vec<Project>,
    current: Option<Project>,
    loading: bool,
}

impl ProjectContext {
    pub fn new(api: ApiClient) -> Self {
        let storage = api.tokens().storage().clone();
        Self {
            api,
            storage,
            projects: Vec::new(),
            current: None,
            loading: true,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Id persisted by an earlier selection, if any.
    pub fn persisted_project_id(&self) -> Option<String> {
        self.storage.get(CURRENT_PROJECT_KEY)
    }

    /// Reload the project list and reconcile the selection with it.
    ///
    /// On failure the list and the selection are emptied and the error is
    /// returned; nothing is retried.
    pub async fn load_projects(&mut self) -> Result<(), ApiError> {
        if !self.api.session().is_authenticated() {
            debug!("No session, skipping project load");
            self.reset();
            return Ok(());
        }

        self.loading = true;
        let result = self.api.list_projects().await;
        self.loading = false;

        match result {
            Ok(projects) => {
                debug!(count = projects.len(), "Projects loaded");
                self.projects = projects;
                self.reconcile_selection()?;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load projects");
                self.projects.clear();
                self.current = None;
                Err(e)
            }
        }
    }

    /// Select `project`, or clear the selection with `None`.
    pub fn set_current_project(&mut self, project: Option<Project>) -> Result<(), StorageError> {
        match project {
            Some(project) => {
                self.storage.set(CURRENT_PROJECT_KEY, &project.id)?;
                self.current = Some(project);
            }
            None => {
                self.storage.remove(CURRENT_PROJECT_KEY)?;
                self.current = None;
            }
        }
        Ok(())
    }

    /// Select the loaded project with `project_id`. Returns false if it is not
    /// in the current list.
    pub fn select_by_id(&mut self, project_id: &str) -> Result<bool, StorageError> {
        match self.find(project_id).cloned() {
            Some(project) => {
                self.set_current_project(Some(project))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forget in-memory state, e.g. after logout. The persisted id is kept.
    pub fn reset(&mut self) {
        self.projects.clear();
        self.current = None;
        self.loading = false;
    }

    fn find(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// Precedence: persisted id, then the current selection if it is still
    /// visible, then the first project in server order.
    fn reconcile_selection(&mut self) -> Result<(), StorageError> {
        let Some(first) = self.projects.first().cloned() else {
            return self.set_current_project(None);
        };

        if let Some(saved) = self.persisted_project_id().and_then(|id| self.find(&id).cloned()) {
            self.current = Some(saved);
            return Ok(());
        }

        let kept = self
            .current
            .as_ref()
            .and_then(|current| self.find(&current.id).cloned());
        self.set_current_project(Some(kept.unwrap_or(first)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RecordingNavigator, TokenStore};
    use crate::storage::MemoryStore;

    fn project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: format!("Project {}", id),
            description: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    fn context() -> ProjectContext {
        let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
        let api = ApiClient::new(
            "http://localhost:8080/api",
            tokens,
            Arc::new(RecordingNavigator::new()),
        )
        .unwrap();
        ProjectContext::new(api)
    }

    #[test]
    fn test_set_current_project_persists_and_clears() {
        let mut ctx = context();
        ctx.set_current_project(Some(project("p-1"))).unwrap();
        assert_eq!(ctx.persisted_project_id().as_deref(), Some("p-1"));
        assert_eq!(ctx.current_project().map(|p| p.id.as_str()), Some("p-1"));

        ctx.set_current_project(None).unwrap();
        assert!(ctx.persisted_project_id().is_none());
        assert!(ctx.current_project().is_none());
    }

    #[test]
    fn test_reconcile_empty_list_clears_selection() {
        let mut ctx = context();
        ctx.set_current_project(Some(project("p-1"))).unwrap();

        ctx.projects = Vec::new();
        ctx.reconcile_selection().unwrap();

        assert!(ctx.current_project().is_none());
        assert!(ctx.persisted_project_id().is_none());
    }

    #[test]
    fn test_reconcile_defaults_to_first() {
        let mut ctx = context();
        ctx.projects = vec![project("p-2"), project("p-1")];
        ctx.reconcile_selection().unwrap();

        assert_eq!(ctx.current_project().map(|p| p.id.as_str()), Some("p-2"));
        assert_eq!(ctx.persisted_project_id().as_deref(), Some("p-2"));
    }

    #[test]
    fn test_reconcile_prefers_persisted_id() {
        let mut ctx = context();
        ctx.storage.set(CURRENT_PROJECT_KEY, "p-3").unwrap();
        ctx.projects = vec![project("p-1"), project("p-2"), project("p-3")];
        ctx.reconcile_selection().unwrap();

        assert_eq!(ctx.current_project().map(|p| p.id.as_str()), Some("p-3"));
    }

    #[test]
    fn test_reconcile_drops_vanished_selection() {
        let mut ctx = context();
        ctx.current = Some(project("gone"));
        ctx.projects = vec![project("p-1")];
        ctx.reconcile_selection().unwrap();

        assert_eq!(ctx.current_project().map(|p| p.id.as_str()), Some("p-1"));
    }

    #[test]
    fn test_select_by_id() {
        let mut ctx = context();
        ctx.projects = vec![project("p-1"), project("p-2")];
        assert!(ctx.select_by_id("p-2").unwrap());
        assert!(!ctx.select_by_id("p-9").unwrap());
        assert_eq!(ctx.current_project().map(|p| p.id.as_str()), Some("p-2"));
    }

    #[tokio::test]
    async fn test_load_without_session_resets() {
        let mut ctx = context();
        ctx.projects = vec![project("p-1")];
        ctx.current = Some(project("p-1"));

        ctx.load_projects().await.unwrap();

        assert!(ctx.projects().is_empty());
        assert!(ctx.current_project().is_none());
        assert!(!ctx.is_loading());
    }
}
