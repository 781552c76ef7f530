//! Orchestrates one conversation turn: resolve the message against the
//! snapshot, normalize the backend's guess, and either answer in plain text
//! or register a confirmable proposal. Confirmation is the only path to the
//! store, and it fires at most once per proposal.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::brain::LlmBackend;
use crate::conversation::{Conversation, ConversationTurn, Proposal};
use crate::dispatcher::MutationDispatcher;
use crate::normalizer::normalize;
use crate::resolver::IntentResolver;
use crate::snapshot::{snapshot_of, TaskSummary};
use crate::store::TaskStore;
use crate::AssistantError;

/// Reply used when the backend call failed or timed out. No intent is
/// inferred from a failed call.
pub const BACKEND_ERROR_REPLY: &str =
    "Sorry, I ran into an error while thinking about that. Please try again.";

/// Reply used when a confirmed mutation was rejected by the store.
pub const MUTATION_FAILED_REPLY: &str =
    "I couldn't apply that change. The task may have been modified elsewhere - \
     please check your task list and try again.";

/// Result of handling one user message.
#[derive(Debug)]
pub struct HandledTurn {
    pub turn: ConversationTurn,
    /// Present when the turn produced a confirmation card.
    pub proposal: Option<Proposal>,
}

pub struct Assistant {
    resolver: IntentResolver,
    dispatcher: MutationDispatcher,
    store: Arc<dyn TaskStore>,
}

impl Assistant {
    pub fn new(backend: Arc<dyn LlmBackend>, store: Arc<dyn TaskStore>) -> Self {
        Self {
            resolver: IntentResolver::new(backend),
            dispatcher: MutationDispatcher::new(store.clone()),
            store,
        }
    }

    /// Open a new conversation surface with a fresh task snapshot.
    pub async fn open_conversation(&self, user_id: Uuid) -> Conversation {
        let snapshot = self.fetch_snapshot(user_id).await;
        Conversation::new(user_id, snapshot)
    }

    /// Resolve one user message into a transcript turn, possibly carrying a
    /// proposal. Every failure path degrades to a plain chat turn; this
    /// never errors and never touches the store.
    pub async fn handle_message(
        &self,
        conversation: &mut Conversation,
        message: &str,
    ) -> HandledTurn {
        conversation.push_user(message);

        let raw = self
            .resolver
            .resolve(message, &conversation.snapshot, Utc::now().date_naive())
            .await;

        let intent = match raw {
            Ok(raw) => normalize(&raw, &conversation.snapshot),
            Err(err) => {
                tracing::warn!("backend unavailable: {}", err);
                let turn = conversation.push_assistant(BACKEND_ERROR_REPLY, None).clone();
                return HandledTurn {
                    turn,
                    proposal: None,
                };
            }
        };

        let reply = intent.reply().to_string();
        match conversation.propose(intent).cloned() {
            Some(proposal) => {
                let turn = conversation
                    .push_assistant(reply, Some(proposal.id))
                    .clone();
                HandledTurn {
                    turn,
                    proposal: Some(proposal),
                }
            }
            None => {
                let turn = conversation.push_assistant(reply, None).clone();
                HandledTurn {
                    turn,
                    proposal: None,
                }
            }
        }
    }

    /// Confirm a pending proposal: transition it (once), dispatch the
    /// mutation, report the outcome in the transcript, and refresh the
    /// snapshot on success so later grounding stays current.
    pub async fn confirm(
        &self,
        conversation: &mut Conversation,
        proposal_id: Uuid,
    ) -> crate::Result<ConversationTurn> {
        let intent = {
            let proposal = conversation
                .proposal_mut(proposal_id)
                .ok_or(AssistantError::ProposalNotFound(proposal_id))?;
            if !proposal.begin_confirm() {
                return Err(AssistantError::ProposalAlreadyResolved(proposal_id));
            }
            proposal.intent.clone()
        };

        let text = match self.dispatcher.apply(conversation.user_id, &intent).await {
            Ok(reply) => {
                conversation.snapshot = self.fetch_snapshot(conversation.user_id).await;
                reply
            }
            Err(err) => {
                tracing::warn!("mutation failed for proposal {}: {}", proposal_id, err);
                MUTATION_FAILED_REPLY.to_string()
            }
        };

        Ok(conversation.push_assistant(text, None).clone())
    }

    /// Snapshot fetch degrades to empty on store failure: all delete/update
    /// references are then ungroundable, which is the safe direction.
    async fn fetch_snapshot(&self, user_id: Uuid) -> Vec<TaskSummary> {
        match self.store.list_tasks(user_id).await {
            Ok(tasks) => snapshot_of(&tasks),
            Err(err) => {
                tracing::warn!("snapshot fetch failed, grounding disabled: {}", err);
                Vec::new()
            }
        }
    }
}
