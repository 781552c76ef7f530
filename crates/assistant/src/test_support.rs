//! Shared mocks: a canned-response LLM backend and a call-recording store.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use db::models::task::{CreateTask, Priority, Task, TaskStatus, UpdateTask};
use uuid::Uuid;

use crate::brain::{BackendError, LlmBackend};
use crate::store::{StoreError, TaskStore};

/// Backend that pops queued responses, recording the prompts it saw.
pub struct MockBackend {
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies_with(text: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.queue(Ok(text.into()));
        backend
    }

    pub fn fails_with(error: BackendError) -> Self {
        let backend = Self::new();
        backend.queue(Err(error));
        backend
    }

    pub fn queue(&self, response: Result<String, BackendError>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::RequestFailed("no response queued".into())))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List,
    Create {
        title: String,
        status: Option<TaskStatus>,
        priority: Option<Priority>,
        had_due_date: bool,
        project_id: Option<Uuid>,
    },
    Update {
        task_id: Uuid,
        title: Option<String>,
        status: Option<TaskStatus>,
        priority: Option<Priority>,
    },
    Delete {
        task_id: Uuid,
    },
}

/// Store that records every call and serves a fixed task list.
pub struct RecordingStore {
    pub tasks: Mutex<Vec<Task>>,
    pub calls: Mutex<Vec<StoreCall>>,
    pub fail_mutations: bool,
    pub fail_list: bool,
}

impl RecordingStore {
    pub fn empty() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            calls: Mutex::new(Vec::new()),
            fail_mutations: false,
            fail_list: false,
        }
    }

    pub fn mutation_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, StoreCall::List))
            .count()
    }
}

pub fn make_task(user_id: Uuid, title: &str, status: TaskStatus) -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::new_v4(),
        user_id,
        project_id: None,
        title: title.to_string(),
        description: None,
        status,
        priority: Priority::Medium,
        due_date: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl TaskStore for RecordingStore {
    async fn list_tasks(&self, _user_id: Uuid) -> Result<Vec<Task>, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::List);
        if self.fail_list {
            return Err(StoreError("store unreachable".into()));
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn create_task(&self, user_id: Uuid, data: CreateTask) -> Result<Task, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Create {
            title: data.title.clone(),
            status: data.status,
            priority: data.priority,
            had_due_date: data.due_date.is_some(),
            project_id: data.project_id,
        });
        if self.fail_mutations {
            return Err(StoreError("create rejected".into()));
        }
        let mut task = make_task(user_id, &data.title, data.status.unwrap_or(TaskStatus::Pending));
        task.priority = data.priority.unwrap_or(Priority::Medium);
        task.due_date = data.due_date;
        task.project_id = data.project_id;
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        data: UpdateTask,
    ) -> Result<Task, StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Update {
            task_id,
            title: data.title.clone(),
            status: data.status,
            priority: data.priority,
        });
        if self.fail_mutations {
            return Err(StoreError("update rejected".into()));
        }
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.user_id == user_id)
            .ok_or_else(|| StoreError("no such task".into()))?;
        if let Some(title) = data.title {
            task.title = title;
        }
        if let Some(status) = data.status {
            task.status = status;
        }
        if let Some(priority) = data.priority {
            task.priority = priority;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(StoreCall::Delete { task_id });
        if self.fail_mutations {
            return Err(StoreError("delete rejected".into()));
        }
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| !(t.id == task_id && t.user_id == user_id));
        if tasks.len() == before {
            return Err(StoreError("no such task".into()));
        }
        Ok(())
    }

    async fn resolve_project(
        &self,
        _user_id: Uuid,
        _reference: &str,
    ) -> Result<Option<Uuid>, StoreError> {
        Ok(None)
    }
}
