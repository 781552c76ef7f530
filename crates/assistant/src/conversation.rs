//! Conversation surface state: the transcript, the snapshot it grounds
//! against, and the proposal state machine.
//!
//! A proposal moves `Proposed -> Confirmed` or `Proposed -> Dismissed`, and
//! the confirm transition fires at most once: the guard lives on the state,
//! not in UI convention, so a duplicate confirm can never dispatch twice.

use db::models::task::Priority;
use serde::Serialize;
use uuid::Uuid;

use crate::intent::Intent;
use crate::snapshot::{find_in_snapshot, TaskSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
    /// Set when this turn carries a confirmation card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalState {
    Proposed,
    Confirmed,
    Dismissed,
}

/// One changed field shown on an update card.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldChange {
    pub field: &'static str,
    pub value: String,
}

/// What the UI renders on a confirmation card: the intent's salient fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProposalCard {
    CreateTask {
        title: String,
        priority: Priority,
        #[serde(skip_serializing_if = "Option::is_none")]
        due_date: Option<String>,
        project: String,
    },
    DeleteTask {
        title: String,
    },
    UpdateTask {
        title: String,
        changes: Vec<FieldChange>,
    },
}

impl ProposalCard {
    /// Render the card for a non-chat intent. `None` for chat intents,
    /// which never enter the proposal state machine.
    pub fn for_intent(intent: &Intent, snapshot: &[TaskSummary]) -> Option<Self> {
        match intent {
            Intent::Chat { .. } => None,
            Intent::Create { draft, .. } => Some(ProposalCard::CreateTask {
                title: draft.title.clone(),
                priority: draft.priority,
                due_date: draft.due_date.clone(),
                project: draft.project.clone(),
            }),
            Intent::Delete { task_title, .. } => Some(ProposalCard::DeleteTask {
                title: task_title.clone(),
            }),
            Intent::Update {
                task_id, updates, ..
            } => {
                let title = find_in_snapshot(snapshot, *task_id)
                    .map(|t| t.title.clone())
                    .unwrap_or_default();
                let mut changes = Vec::new();
                if let Some(status) = updates.status {
                    changes.push(FieldChange {
                        field: "status",
                        value: status.to_string(),
                    });
                }
                if let Some(new_title) = &updates.title {
                    changes.push(FieldChange {
                        field: "title",
                        value: new_title.clone(),
                    });
                }
                if let Some(priority) = updates.priority {
                    changes.push(FieldChange {
                        field: "priority",
                        value: priority.to_string(),
                    });
                }
                Some(ProposalCard::UpdateTask { title, changes })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    pub id: Uuid,
    pub state: ProposalState,
    pub card: ProposalCard,
    #[serde(skip)]
    pub intent: Intent,
}

impl Proposal {
    /// Transition `Proposed -> Confirmed`. Returns `false` (and changes
    /// nothing) unless the proposal is still pending, which makes
    /// confirmation structurally once-only.
    pub fn begin_confirm(&mut self) -> bool {
        if self.state == ProposalState::Proposed {
            self.state = ProposalState::Confirmed;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        if self.state == ProposalState::Proposed {
            self.state = ProposalState::Dismissed;
        }
    }
}

/// State owned by one open chat surface. Created when the surface opens,
/// dropped when it closes; never persisted.
#[derive(Debug)]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub transcript: Vec<ConversationTurn>,
    pub proposals: Vec<Proposal>,
    pub snapshot: Vec<TaskSummary>,
}

pub const GREETING: &str = "Hey! I'm your TaskNest assistant. Tell me something like \
    'Call John tomorrow at 5pm' and I'll organize it for you.";

impl Conversation {
    pub fn new(user_id: Uuid, snapshot: Vec<TaskSummary>) -> Self {
        let mut conversation = Self {
            id: Uuid::new_v4(),
            user_id,
            transcript: Vec::new(),
            proposals: Vec::new(),
            snapshot,
        };
        conversation.push_assistant(GREETING, None);
        conversation
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.transcript.push(ConversationTurn {
            role: TurnRole::User,
            text: text.into(),
            proposal_id: None,
        });
        self.transcript.last().expect("just pushed")
    }

    pub fn push_assistant(
        &mut self,
        text: impl Into<String>,
        proposal_id: Option<Uuid>,
    ) -> &ConversationTurn {
        self.transcript.push(ConversationTurn {
            role: TurnRole::Assistant,
            text: text.into(),
            proposal_id,
        });
        self.transcript.last().expect("just pushed")
    }

    /// Register a non-chat intent as a pending proposal. Returns `None`
    /// for chat intents.
    pub fn propose(&mut self, intent: Intent) -> Option<&Proposal> {
        let card = ProposalCard::for_intent(&intent, &self.snapshot)?;
        self.proposals.push(Proposal {
            id: Uuid::new_v4(),
            state: ProposalState::Proposed,
            card,
            intent,
        });
        self.proposals.last()
    }

    pub fn proposal(&self, id: Uuid) -> Option<&Proposal> {
        self.proposals.iter().find(|p| p.id == id)
    }

    pub fn proposal_mut(&mut self, id: Uuid) -> Option<&mut Proposal> {
        self.proposals.iter_mut().find(|p| p.id == id)
    }
}
