//! SQLite-backed implementation of the assistant's task store.

use assistant::{StoreError, TaskStore};
use async_trait::async_trait;
use db::{
    models::{
        project::Project,
        task::{CreateTask, Task, UpdateTask},
    },
    DBService,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteTaskStore {
    db: DBService,
}

impl SqliteTaskStore {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }
}

fn store_err(err: sqlx::Error) -> StoreError {
    StoreError(err.to_string())
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list_tasks(&self, user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        Task::find_by_user_id(&self.db.pool, user_id)
            .await
            .map_err(store_err)
    }

    async fn create_task(&self, user_id: Uuid, data: CreateTask) -> Result<Task, StoreError> {
        Task::create(&self.db.pool, user_id, &data)
            .await
            .map_err(store_err)
    }

    async fn update_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Task, StoreError> {
        Task::update(&self.db.pool, task_id, user_id, &data)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError(format!("task {} not found", task_id)))
    }

    async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), StoreError> {
        let rows = Task::delete(&self.db.pool, task_id, user_id)
            .await
            .map_err(store_err)?;
        if rows == 0 {
            return Err(StoreError(format!("task {} not found", task_id)));
        }
        Ok(())
    }

    /// A project reference may be an id or a name. Names match
    /// case-insensitively against the caller's own projects.
    async fn resolve_project(
        &self,
        user_id: Uuid,
        reference: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        if let Ok(id) = Uuid::parse_str(reference) {
            let project = Project::find_by_id(&self.db.pool, id, user_id)
                .await
                .map_err(store_err)?;
            if let Some(project) = project {
                return Ok(Some(project.id));
            }
        }
        let project = Project::find_by_name(&self.db.pool, user_id, reference)
            .await
            .map_err(store_err)?;
        Ok(project.map(|p| p.id))
    }
}
