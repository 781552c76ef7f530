use db::models::task::{Priority, TaskStatus};
use serde::Serialize;
use uuid::Uuid;

/// Sentinel project name the model emits when the user named no project.
pub const GENERAL_PROJECT: &str = "General";

/// Fields of a task the user asked to create. `due_date` stays an opaque
/// string until dispatch: the model usually resolves relative phrases to an
/// ISO date (the prompt carries the current date), but whatever arrives is
/// only parsed at mutation time.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub project: String,
}

/// Partial update extracted from an `update_task` intent. Unrecognized
/// fields in the raw payload are dropped before this is built.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TaskUpdates {
    pub status: Option<TaskStatus>,
    pub title: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskUpdates {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.title.is_none() && self.priority.is_none()
    }
}

/// A user message resolved into exactly one structured intent. Delete and
/// update intents are only ever constructed with a `task_id` present in the
/// snapshot supplied for that turn; ungroundable references degrade to
/// `Chat` before this type is built.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Chat {
        reply: String,
    },
    Create {
        reply: String,
        draft: TaskDraft,
    },
    Delete {
        reply: String,
        task_id: Uuid,
        task_title: String,
    },
    Update {
        reply: String,
        task_id: Uuid,
        updates: TaskUpdates,
    },
}

impl Intent {
    /// Human-readable reply, usable as the confirmation prompt text.
    pub fn reply(&self) -> &str {
        match self {
            Intent::Chat { reply }
            | Intent::Create { reply, .. }
            | Intent::Delete { reply, .. }
            | Intent::Update { reply, .. } => reply,
        }
    }

    pub fn is_chat(&self) -> bool {
        matches!(self, Intent::Chat { .. })
    }
}
