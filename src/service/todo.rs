//! TodoService: validate, run one storage call, return the result.

use super::RequestValidator;
use crate::error::AppError;
use crate::model::{CreateTodo, ListParams, Todo, TodoPatch, Toggled};
use crate::store::TodoStore;
use chrono::Utc;
use std::sync::Arc;

pub const HEALTH_STATUS: &str = "UP";

/// Owns the shared storage handle. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        TodoService { store }
    }

    pub fn health(&self) -> &'static str {
        HEALTH_STATUS
    }

    /// Storage reachability, for readiness probes.
    pub async fn ready(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "storage ping failed");
                false
            }
        }
    }

    /// Page of rows plus the filtered total ignoring pagination.
    pub async fn list(&self, params: &ListParams) -> Result<(Vec<Todo>, i64), AppError> {
        let rows = self.store.list(params).await?;
        let total = self.store.count(params.completed).await?;
        Ok((rows, total))
    }

    pub async fn create(&self, body: CreateTodo) -> Result<Todo, AppError> {
        let new = RequestValidator::validate_create(body)?;
        let todo = self.store.insert(&new, Utc::now()).await?;
        tracing::info!(id = todo.id, "todo created");
        Ok(todo)
    }

    /// Apply a sparse patch and return the record as stored afterwards.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, AppError> {
        let changes = RequestValidator::validate_patch(patch)?;
        let todo = self
            .store
            .update(id, &changes, Utc::now())
            .await?
            .ok_or(AppError::NotFound(id))?;
        tracing::info!(id, "todo updated");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(id));
        }
        tracing::info!(id, "todo deleted");
        Ok(())
    }

    pub async fn toggle(&self, id: i64) -> Result<Toggled, AppError> {
        let todo = self
            .store
            .toggle(id, Utc::now())
            .await?
            .ok_or(AppError::NotFound(id))?;
        tracing::info!(id, completed = todo.completed, "todo toggled");
        Ok(todo.into())
    }

    pub async fn delete_completed(&self) -> Result<u64, AppError> {
        let count = self.store.delete_completed().await?;
        tracing::info!(count, "completed todos deleted");
        Ok(count)
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let count = self.store.delete_all().await?;
        tracing::info!(count, "all todos deleted");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteTodoStore;

    async fn service() -> TodoService {
        TodoService::new(Arc::new(SqliteTodoStore::in_memory().await.unwrap()))
    }

    fn create_body(title: &str) -> CreateTodo {
        CreateTodo {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn health_does_not_touch_storage() {
        assert_eq!(service().await.health(), "UP");
    }

    #[tokio::test]
    async fn ready_when_storage_answers() {
        assert!(service().await.ready().await);
    }

    #[tokio::test]
    async fn create_rejects_empty_title() {
        let svc = service().await;
        assert!(matches!(
            svc.create(create_body("")).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(svc.list(&ListParams::default()).await.unwrap().1, 0);
    }

    #[tokio::test]
    async fn toggle_twice_restores_completed() {
        let svc = service().await;
        let todo = svc.create(create_body("Laundry")).await.unwrap();

        let first = svc.toggle(todo.id).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = svc.toggle(todo.id).await.unwrap();

        assert!(first.completed);
        assert_eq!(second.completed, todo.completed);
        assert!(first.updated_at >= todo.updated_at);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn update_returns_post_patch_record() {
        let svc = service().await;
        let todo = svc.create(create_body("Draft")).await.unwrap();
        let patch: TodoPatch = serde_json::from_str(r#"{"title": "Final", "priority": 2}"#).unwrap();
        let updated = svc.update(todo.id, patch).await.unwrap();
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.priority, 2);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let svc = service().await;
        assert!(matches!(svc.delete(9).await, Err(AppError::NotFound(9))));
        assert!(matches!(svc.toggle(9).await, Err(AppError::NotFound(9))));
        assert!(matches!(
            svc.update(9, TodoPatch::default()).await,
            Err(AppError::NotFound(9))
        ));
    }

    #[tokio::test]
    async fn delete_completed_leaves_open_todos() {
        let svc = service().await;
        let open = svc.create(create_body("open")).await.unwrap();
        let done = svc.create(create_body("done")).await.unwrap();
        svc.toggle(done.id).await.unwrap();

        assert_eq!(svc.delete_completed().await.unwrap(), 1);
        let (rows, total) = svc.list(&ListParams::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].id, open.id);
    }
}
