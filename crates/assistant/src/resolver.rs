//! Builds the instruction block for one conversation turn and invokes the
//! text-generation backend exactly once. No retries, no multi-turn planning:
//! semantic failures are the normalizer's problem, transport failures are
//! surfaced as [`BackendError`].

use std::sync::Arc;

use chrono::NaiveDate;

use crate::brain::{BackendError, LlmBackend};
use crate::snapshot::TaskSummary;

pub struct IntentResolver {
    backend: Arc<dyn LlmBackend>,
}

impl IntentResolver {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// One backend call per user message. Returns the raw completion text.
    pub async fn resolve(
        &self,
        message: &str,
        snapshot: &[TaskSummary],
        today: NaiveDate,
    ) -> Result<String, BackendError> {
        let prompt = build_prompt(message, snapshot, today);
        self.backend.complete(&prompt).await
    }
}

/// Single instruction block: current date (for relative due dates), the
/// snapshot as `id | title | status` lines, and the four permitted schemas.
pub fn build_prompt(message: &str, snapshot: &[TaskSummary], today: NaiveDate) -> String {
    let task_listing = if snapshot.is_empty() {
        "(the user has no tasks)".to_string()
    } else {
        snapshot
            .iter()
            .map(|t| format!("{} | {} | {}", t.id, t.title, t.status))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are the AI task assistant for TaskNest.
The current date is {today}.

The user's current tasks, one per line as `id | title | status`:
{task_listing}

Decide what the user wants and respond with exactly ONE JSON object matching one of these schemas:

If the user wants to create a task:
{{
  "intent": "create_task",
  "task": {{
    "title": "string",
    "priority": "High" | "Medium" | "Low",
    "dueDate": "string (ISO date, resolve relative phrases like 'tomorrow' using the current date)",
    "project": "string (use \"General\" if no project was named)"
  }},
  "reply": "A short confirmation question"
}}

If the user wants to delete an existing task:
{{
  "intent": "delete_task",
  "taskId": "the id copied verbatim from the task list above",
  "taskTitle": "that task's title",
  "reply": "A short confirmation question"
}}

If the user wants to change an existing task (status, title or priority):
{{
  "intent": "update_task",
  "taskId": "the id copied verbatim from the task list above",
  "updates": {{ "status": "Pending" | "In Progress" | "Completed", "title": "string", "priority": "High" | "Medium" | "Low" }},
  "reply": "A short confirmation question"
}}
Include only the fields that should change inside "updates".

If the user is just chatting or asking a question:
{{
  "intent": "chat",
  "reply": "Your helpful response"
}}

Never invent a taskId: if the message refers to a task that is not in the list above, answer with the "chat" schema instead.

User message: "{message}"

Return ONLY the JSON."#,
    )
}
