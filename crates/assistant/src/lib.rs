//! # TaskNest Assistant
//!
//! Turns free-text chat messages into structured task operations. A single
//! user message is resolved against a snapshot of the user's tasks into one
//! of four intents (chat, create, delete, update); anything destructive is
//! surfaced as a proposal card that the user must confirm before the task
//! store is touched.

pub mod agent;
pub mod brain;
pub mod conversation;
pub mod dispatcher;
pub mod intent;
pub mod normalizer;
pub mod resolver;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod normalizer_tests;

pub use agent::{Assistant, HandledTurn};
pub use brain::{BackendError, LlmBackend, LlmConfig, OpenAiBackend};
pub use conversation::{
    Conversation, ConversationTurn, Proposal, ProposalCard, ProposalState, TurnRole,
};
pub use intent::{Intent, TaskDraft, TaskUpdates};
pub use resolver::IntentResolver;
pub use snapshot::TaskSummary;
pub use store::{StoreError, TaskStore};

/// Errors surfaced by assistant operations.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("LLM backend error: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Proposal {0} not found")]
    ProposalNotFound(uuid::Uuid),

    #[error("Proposal {0} was already confirmed or dismissed")]
    ProposalAlreadyResolved(uuid::Uuid),
}

pub type Result<T> = std::result::Result<T, AssistantError>;
