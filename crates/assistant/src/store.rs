//! The external task store as seen by the assistant: plain per-row CRUD.
//! The server provides the SQLite-backed implementation; tests provide a
//! recording mock.

use async_trait::async_trait;
use db::models::task::{CreateTask, Task, UpdateTask};
use uuid::Uuid;

/// Opaque store failure. The assistant does not distinguish failure causes;
/// anything that goes wrong at the store becomes a failure turn.
#[derive(Debug, thiserror::Error)]
#[error("task store error: {0}")]
pub struct StoreError(pub String);

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All the caller's tasks, newest first. Side-effect free.
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn create_task(&self, user_id: Uuid, data: CreateTask) -> Result<Task, StoreError>;

    /// Partial update: fields absent from `data` must be left untouched.
    async fn update_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Task, StoreError>;

    async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), StoreError>;

    /// Resolve a project reference (id or name) against the caller's
    /// projects. `None` when nothing matches.
    async fn resolve_project(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Option<Uuid>, StoreError>;
}
