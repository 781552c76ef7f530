use db::models::task::{Task, TaskStatus};
use serde::Serialize;
use uuid::Uuid;

/// Read-only projection of one task, used to ground natural-language
/// references ("the database task") to concrete identifiers.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
    pub status: TaskStatus,
}

impl TaskSummary {
    pub fn new(id: Uuid, title: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id,
            title: title.into(),
            status,
        }
    }
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
        }
    }
}

/// Project a full task list into the snapshot the resolver works against.
pub fn snapshot_of(tasks: &[Task]) -> Vec<TaskSummary> {
    tasks.iter().map(TaskSummary::from).collect()
}

/// Look up a snapshot entry by id.
pub fn find_in_snapshot(snapshot: &[TaskSummary], id: Uuid) -> Option<&TaskSummary> {
    snapshot.iter().find(|t| t.id == id)
}
