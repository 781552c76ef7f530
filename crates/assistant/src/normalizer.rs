//! Validates and repairs raw model output into a typed [`Intent`].
//!
//! Model output is untrusted: it may be wrapped in markdown fences, miss
//! fields, invent enum values, or reference task ids that do not exist.
//! Every failure path degrades to `Intent::Chat` rather than erroring, so
//! nothing downstream ever sees a destructive intent it cannot trust.

use db::models::task::{Priority, TaskStatus};
use serde_json::Value;
use uuid::Uuid;

use crate::intent::{Intent, TaskDraft, TaskUpdates, GENERAL_PROJECT};
use crate::snapshot::{find_in_snapshot, TaskSummary};

/// Reply used when the payload was not parseable or failed validation.
pub const MALFORMED_REPLY: &str =
    "Sorry, I didn't understand that. Could you rephrase what you'd like me to do?";

/// Reply used when a delete/update referenced a task id not in the snapshot.
pub const UNGROUNDED_REPLY: &str =
    "I couldn't match that to one of your current tasks, so I haven't changed anything. \
     Could you tell me which task you mean?";

/// Reply used for a chat intent that arrived without reply text.
pub const DEFAULT_CHAT_REPLY: &str = "Happy to help! What would you like to do with your tasks?";

/// Normalize raw backend text into an intent. Never fails: malformed or
/// ungroundable payloads come back as `Intent::Chat`.
pub fn normalize(raw: &str, snapshot: &[TaskSummary]) -> Intent {
    let json_str = extract_json(raw);
    let value: Value = match serde_json::from_str(json_str) {
        Ok(value) => value,
        Err(err) => {
            let preview: String = json_str.chars().take(200).collect();
            tracing::warn!("malformed intent payload ({}): {}", err, preview);
            return Intent::Chat {
                reply: MALFORMED_REPLY.to_string(),
            };
        }
    };

    let reply = non_empty_str(&value["reply"]);
    let salvaged_chat = |reply: Option<String>| Intent::Chat {
        reply: reply.unwrap_or_else(|| MALFORMED_REPLY.to_string()),
    };

    match value["intent"].as_str() {
        Some("chat") => Intent::Chat {
            reply: reply.unwrap_or_else(|| DEFAULT_CHAT_REPLY.to_string()),
        },
        Some("create_task") => match normalize_draft(&value["task"]) {
            Some(draft) => {
                let reply = reply.unwrap_or_else(|| {
                    format!("I can add \"{}\" to your tasks. Confirm to create it.", draft.title)
                });
                Intent::Create { reply, draft }
            }
            None => {
                tracing::warn!("create_task payload missing a usable title");
                salvaged_chat(reply)
            }
        },
        Some("delete_task") => match ground_task_id(&value, snapshot) {
            Some(task) => {
                let task_title = non_empty_str(&value["taskTitle"])
                    .unwrap_or_else(|| task.title.clone());
                let reply = reply
                    .unwrap_or_else(|| format!("Should I delete \"{}\"?", task_title));
                Intent::Delete {
                    reply,
                    task_id: task.id,
                    task_title,
                }
            }
            None => Intent::Chat {
                reply: UNGROUNDED_REPLY.to_string(),
            },
        },
        Some("update_task") => match ground_task_id(&value, snapshot) {
            Some(task) => {
                let updates = normalize_updates(&value["updates"]);
                if updates.is_empty() {
                    tracing::warn!("update_task payload carried no recognizable updates");
                    return salvaged_chat(reply);
                }
                let reply = reply
                    .unwrap_or_else(|| format!("Should I update \"{}\"?", task.title));
                Intent::Update {
                    reply,
                    task_id: task.id,
                    updates,
                }
            }
            None => Intent::Chat {
                reply: UNGROUNDED_REPLY.to_string(),
            },
        },
        _ => {
            tracing::warn!(
                "unrecognized intent discriminator: {:?}",
                value["intent"].as_str()
            );
            salvaged_chat(reply)
        }
    }
}

/// Extract the JSON payload from model output that may be wrapped in
/// markdown code fences or surrounded by prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        if let Some(start) = trimmed.find('\n') {
            let after_fence = &trimmed[start + 1..];
            if let Some(end) = after_fence.rfind("```") {
                return after_fence[..end].trim();
            }
        }
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if start < end {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

/// Grounding check: the referenced task id must parse as a UUID and exist
/// in the snapshot supplied for this turn.
fn ground_task_id<'a>(value: &Value, snapshot: &'a [TaskSummary]) -> Option<&'a TaskSummary> {
    let raw_id = non_empty_str(&value["taskId"]).or_else(|| non_empty_str(&value["task_id"]))?;
    let id = match Uuid::parse_str(raw_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("backend referenced a non-uuid task id: {}", raw_id);
            return None;
        }
    };
    let found = find_in_snapshot(snapshot, id);
    if found.is_none() {
        tracing::warn!("backend referenced task {} absent from the snapshot", id);
    }
    found
}

fn normalize_draft(task: &Value) -> Option<TaskDraft> {
    let title = non_empty_str(&task["title"])?;
    let priority = task["priority"]
        .as_str()
        .and_then(Priority::from_loose)
        .unwrap_or(Priority::Medium);
    let due_date =
        non_empty_str(&task["dueDate"]).or_else(|| non_empty_str(&task["due_date"]));
    let project = non_empty_str(&task["project"]).unwrap_or_else(|| GENERAL_PROJECT.to_string());

    Some(TaskDraft {
        title,
        priority,
        due_date,
        project,
    })
}

/// Keep only the fields an update is allowed to touch; drop the rest.
fn normalize_updates(updates: &Value) -> TaskUpdates {
    TaskUpdates {
        status: updates["status"].as_str().and_then(TaskStatus::from_loose),
        title: non_empty_str(&updates["title"]),
        priority: updates["priority"].as_str().and_then(Priority::from_loose),
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
