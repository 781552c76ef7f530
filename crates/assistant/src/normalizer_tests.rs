//! Tests for tolerant parsing, defaulting and the grounding invariant.

use db::models::task::{Priority, TaskStatus};
use uuid::Uuid;

use crate::intent::Intent;
use crate::normalizer::{
    extract_json, normalize, DEFAULT_CHAT_REPLY, MALFORMED_REPLY, UNGROUNDED_REPLY,
};
use crate::snapshot::TaskSummary;

fn snapshot_with(title: &str) -> (Uuid, Vec<TaskSummary>) {
    let id = Uuid::new_v4();
    (id, vec![TaskSummary::new(id, title, TaskStatus::Pending)])
}

#[test]
fn test_extract_json_strips_markdown_fences() {
    let raw = "```json\n{\"intent\": \"chat\", \"reply\": \"hi\"}\n```";
    assert_eq!(extract_json(raw), "{\"intent\": \"chat\", \"reply\": \"hi\"}");

    let raw = "```\n{\"a\": 1}\n```";
    assert_eq!(extract_json(raw), "{\"a\": 1}");
}

#[test]
fn test_extract_json_slices_surrounding_prose() {
    let raw = "Sure, here you go: {\"intent\": \"chat\", \"reply\": \"hi\"} hope that helps";
    assert_eq!(extract_json(raw), "{\"intent\": \"chat\", \"reply\": \"hi\"}");
}

#[test]
fn test_invalid_json_degrades_to_chat() {
    let intent = normalize("not json at all", &[]);
    assert_eq!(
        intent,
        Intent::Chat {
            reply: MALFORMED_REPLY.to_string()
        }
    );
}

#[test]
fn test_missing_discriminator_degrades_to_chat() {
    let intent = normalize(r#"{"reply": "I think you want a task"}"#, &[]);
    assert_eq!(
        intent,
        Intent::Chat {
            reply: "I think you want a task".to_string()
        }
    );
}

#[test]
fn test_unknown_discriminator_without_reply_uses_fallback() {
    let intent = normalize(r#"{"intent": "reschedule_everything"}"#, &[]);
    assert_eq!(
        intent,
        Intent::Chat {
            reply: MALFORMED_REPLY.to_string()
        }
    );
}

#[test]
fn test_chat_with_missing_reply_gets_default() {
    let intent = normalize(r#"{"intent": "chat"}"#, &[]);
    assert_eq!(
        intent,
        Intent::Chat {
            reply: DEFAULT_CHAT_REPLY.to_string()
        }
    );
}

#[test]
fn test_create_defaults_priority_and_project() {
    let raw = r#"{"intent": "create_task", "task": {"title": "Call mom"}, "reply": "Add it?"}"#;
    match normalize(raw, &[]) {
        Intent::Create { draft, .. } => {
            assert_eq!(draft.title, "Call mom");
            assert_eq!(draft.priority, Priority::Medium);
            assert_eq!(draft.project, "General");
            assert_eq!(draft.due_date, None);
        }
        other => panic!("expected create intent, got {:?}", other),
    }
}

#[test]
fn test_create_with_invalid_priority_defaults_to_medium() {
    let raw = r#"{"intent": "create_task", "task": {"title": "X", "priority": "Extreme"}}"#;
    match normalize(raw, &[]) {
        Intent::Create { draft, .. } => assert_eq!(draft.priority, Priority::Medium),
        other => panic!("expected create intent, got {:?}", other),
    }
}

#[test]
fn test_create_without_title_degrades_to_chat() {
    let raw = r#"{"intent": "create_task", "task": {"priority": "High"}, "reply": "Got it"}"#;
    assert_eq!(
        normalize(raw, &[]),
        Intent::Chat {
            reply: "Got it".to_string()
        }
    );
}

#[test]
fn test_create_passes_due_date_through_opaque() {
    let raw = r#"{"intent": "create_task", "task": {"title": "X", "dueDate": "sometime next quarter"}}"#;
    match normalize(raw, &[]) {
        Intent::Create { draft, .. } => {
            assert_eq!(draft.due_date.as_deref(), Some("sometime next quarter"));
        }
        other => panic!("expected create intent, got {:?}", other),
    }
}

#[test]
fn test_delete_grounded_in_snapshot() {
    let (id, snapshot) = snapshot_with("Pay rent");
    let raw = format!(r#"{{"intent": "delete_task", "taskId": "{id}", "reply": "Delete it?"}}"#);
    match normalize(&raw, &snapshot) {
        Intent::Delete {
            task_id,
            task_title,
            ..
        } => {
            assert_eq!(task_id, id);
            assert_eq!(task_title, "Pay rent");
        }
        other => panic!("expected delete intent, got {:?}", other),
    }
}

#[test]
fn test_delete_with_fabricated_id_degrades() {
    let (_, snapshot) = snapshot_with("Pay rent");
    let raw = format!(
        r#"{{"intent": "delete_task", "taskId": "{}", "taskTitle": "Pay rent"}}"#,
        Uuid::new_v4()
    );
    assert_eq!(
        normalize(&raw, &snapshot),
        Intent::Chat {
            reply: UNGROUNDED_REPLY.to_string()
        }
    );
}

#[test]
fn test_delete_against_empty_snapshot_degrades() {
    let raw = format!(r#"{{"intent": "delete_task", "taskId": "{}"}}"#, Uuid::new_v4());
    assert_eq!(
        normalize(&raw, &[]),
        Intent::Chat {
            reply: UNGROUNDED_REPLY.to_string()
        }
    );
}

#[test]
fn test_delete_with_non_uuid_id_degrades() {
    let (_, snapshot) = snapshot_with("Pay rent");
    let raw = r#"{"intent": "delete_task", "taskId": "the rent one"}"#;
    assert_eq!(
        normalize(raw, &snapshot),
        Intent::Chat {
            reply: UNGROUNDED_REPLY.to_string()
        }
    );
}

#[test]
fn test_update_status_done_maps_to_completed() {
    let (id, snapshot) = snapshot_with("Database Schema Implementation");
    let raw = format!(
        r#"{{"intent": "update_task", "taskId": "{id}", "updates": {{"status": "Completed"}}, "reply": "Mark it done?"}}"#
    );
    match normalize(&raw, &snapshot) {
        Intent::Update {
            task_id, updates, ..
        } => {
            assert_eq!(task_id, id);
            assert_eq!(updates.status, Some(TaskStatus::Completed));
            assert_eq!(updates.title, None);
            assert_eq!(updates.priority, None);
        }
        other => panic!("expected update intent, got {:?}", other),
    }
}

#[test]
fn test_update_drops_unrecognized_fields() {
    let (id, snapshot) = snapshot_with("X");
    let raw = format!(
        r#"{{"intent": "update_task", "taskId": "{id}", "updates": {{"priority": "High", "assignee": "bob", "color": "red"}}}}"#
    );
    match normalize(&raw, &snapshot) {
        Intent::Update { updates, .. } => {
            assert_eq!(updates.priority, Some(Priority::High));
            assert_eq!(updates.title, None);
            assert_eq!(updates.status, None);
        }
        other => panic!("expected update intent, got {:?}", other),
    }
}

#[test]
fn test_update_with_only_unrecognized_fields_degrades() {
    let (id, snapshot) = snapshot_with("X");
    let raw = format!(
        r#"{{"intent": "update_task", "taskId": "{id}", "updates": {{"assignee": "bob"}}, "reply": "Reassign it?"}}"#
    );
    assert_eq!(
        normalize(&raw, &snapshot),
        Intent::Chat {
            reply: "Reassign it?".to_string()
        }
    );
}

#[test]
fn test_update_with_ungrounded_id_degrades() {
    let (_, snapshot) = snapshot_with("X");
    let raw = format!(
        r#"{{"intent": "update_task", "taskId": "{}", "updates": {{"status": "Completed"}}}}"#,
        Uuid::new_v4()
    );
    assert_eq!(
        normalize(&raw, &snapshot),
        Intent::Chat {
            reply: UNGROUNDED_REPLY.to_string()
        }
    );
}

#[test]
fn test_every_intent_carries_a_reply() {
    let (id, snapshot) = snapshot_with("Pay rent");
    // None of these payloads carry a reply; each normalized intent still
    // must have confirmation text.
    let payloads = [
        r#"{"intent": "chat"}"#.to_string(),
        r#"{"intent": "create_task", "task": {"title": "X"}}"#.to_string(),
        format!(r#"{{"intent": "delete_task", "taskId": "{id}"}}"#),
        format!(r#"{{"intent": "update_task", "taskId": "{id}", "updates": {{"status": "done"}}}}"#),
    ];
    for payload in payloads {
        let intent = normalize(&payload, &snapshot);
        assert!(!intent.reply().is_empty(), "no reply for {}", payload);
    }
}
