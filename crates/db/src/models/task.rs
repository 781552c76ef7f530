use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Tolerant parser for untrusted input (model output, query strings).
    /// Returns `None` for anything that is not recognizably one of the
    /// three statuses.
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "pending" | "todo" | "open" => Some(TaskStatus::Pending),
            "inprogress" | "in progress" | "started" => Some(TaskStatus::InProgress),
            "completed" | "complete" | "done" => Some(TaskStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq)]
#[sqlx(type_name = "priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn from_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "normal" => Some(Priority::Medium),
            "high" | "urgent" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
}

/// Partial update payload. Fields left as `None` are not modified.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
}

impl Task {
    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        data: &CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, user_id, project_id, title, description, status, priority, due_date, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status.unwrap_or(TaskStatus::Pending))
        .bind(data.priority.unwrap_or(Priority::Medium))
        .bind(data.due_date)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
    }

    /// Partial update: `COALESCE` keeps the stored value for every field the
    /// payload leaves unset, so absent fields are never clobbered.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
        data: &UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET title = COALESCE($3, title),
                   description = COALESCE($4, description),
                   status = COALESCE($5, status),
                   priority = COALESCE($6, priority),
                   due_date = COALESCE($7, due_date),
                   project_id = COALESCE($8, project_id),
                   updated_at = $9
               WHERE id = $1 AND user_id = $2
               RETURNING *"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.project_id)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(
        pool: &SqlitePool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_loose() {
        assert_eq!(TaskStatus::from_loose("Completed"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::from_loose("done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::from_loose("In Progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_loose("in_progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_loose("PENDING"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::from_loose("blocked"), None);
    }

    #[test]
    fn test_priority_from_loose() {
        assert_eq!(Priority::from_loose("High"), Some(Priority::High));
        assert_eq!(Priority::from_loose("urgent"), Some(Priority::High));
        assert_eq!(Priority::from_loose("medium"), Some(Priority::Medium));
        assert_eq!(Priority::from_loose("whenever"), None);
    }

    #[tokio::test]
    async fn test_partial_update_leaves_absent_fields_untouched() {
        let db = crate::DBService::new_in_memory().await.unwrap();
        let user = crate::models::user::User::create(
            &db.pool,
            "alice",
            "alice@example.com",
            "hash",
        )
        .await
        .unwrap();

        let task = Task::create(
            &db.pool,
            user.id,
            &CreateTask {
                title: "Pay rent".into(),
                description: Some("first of the month".into()),
                status: None,
                priority: Some(Priority::High),
                due_date: None,
                project_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let updated = Task::update(
            &db.pool,
            task.id,
            user.id,
            &UpdateTask {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.title, "Pay rent");
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.description.as_deref(), Some("first of the month"));
    }

    #[tokio::test]
    async fn test_delete_reports_rows_affected() {
        let db = crate::DBService::new_in_memory().await.unwrap();
        let user = crate::models::user::User::create(&db.pool, "bob", "bob@example.com", "hash")
            .await
            .unwrap();

        let task = Task::create(
            &db.pool,
            user.id,
            &CreateTask {
                title: "Temp".into(),
                description: None,
                status: None,
                priority: None,
                due_date: None,
                project_id: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(Task::delete(&db.pool, task.id, user.id).await.unwrap(), 1);
        assert_eq!(Task::delete(&db.pool, task.id, user.id).await.unwrap(), 0);
    }
}
