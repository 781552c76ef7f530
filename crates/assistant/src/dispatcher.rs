//! Applies a confirmed intent to the external task store and produces the
//! transcript-ready outcome text. Each operation is a single store call;
//! there is no optimistic local mutation and no partial state on failure.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use db::models::task::{CreateTask, TaskStatus, UpdateTask};
use uuid::Uuid;

use crate::intent::{Intent, TaskDraft, GENERAL_PROJECT};
use crate::store::{StoreError, TaskStore};

pub struct MutationDispatcher {
    store: Arc<dyn TaskStore>,
}

impl MutationDispatcher {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Dispatch one confirmed intent. Returns the success reply for the
    /// transcript; store rejections come back as `StoreError` and are
    /// reported as a failure turn by the caller.
    pub async fn apply(&self, user_id: Uuid, intent: &Intent) -> Result<String, StoreError> {
        match intent {
            // Chat never reaches the dispatcher through a proposal; nothing
            // to apply if it somehow does.
            Intent::Chat { reply } => Ok(reply.clone()),
            Intent::Create { draft, .. } => self.apply_create(user_id, draft).await,
            Intent::Delete {
                task_id,
                task_title,
                ..
            } => {
                self.store.delete_task(user_id, *task_id).await?;
                Ok(format!("Done! I've deleted \"{}\".", task_title))
            }
            Intent::Update {
                task_id, updates, ..
            } => {
                let data = UpdateTask {
                    title: updates.title.clone(),
                    status: updates.status,
                    priority: updates.priority,
                    ..Default::default()
                };
                let task = self.store.update_task(user_id, *task_id, data).await?;
                Ok(format!("Done! I've updated \"{}\".", task.title))
            }
        }
    }

    async fn apply_create(&self, user_id: Uuid, draft: &TaskDraft) -> Result<String, StoreError> {
        let due_date = draft.due_date.as_deref().and_then(parse_due_date);
        let project_id = match draft.project.trim() {
            "" | GENERAL_PROJECT => None,
            reference => self.store.resolve_project(user_id, reference).await?,
        };

        let data = CreateTask {
            title: draft.title.clone(),
            description: None,
            status: Some(TaskStatus::Pending),
            priority: Some(draft.priority),
            due_date,
            project_id,
        };
        let task = self.store.create_task(user_id, data).await?;
        Ok(format!("Great! I've added \"{}\" to your tasks.", task.title))
    }
}

/// Lenient due-date parsing. The model is asked to emit ISO dates, but the
/// field is untrusted: anything unparseable means "no due date" rather than
/// a rejected create.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    tracing::debug!("due date {:?} not parseable, storing no due date", s);
    None
}
