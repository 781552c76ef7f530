//! Chat surface endpoints. Conversations live in memory for the lifetime of
//! the surface; closing one drops its state, including any result from a
//! resolve that is still in flight.

use std::sync::Arc;

use assistant::{Conversation, ConversationTurn, Proposal};
use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, middleware::CurrentUser, AppState, ConversationEntry};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationView {
    pub id: Uuid,
    pub transcript: Vec<ConversationTurn>,
    pub proposals: Vec<Proposal>,
}

impl ConversationView {
    fn of(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id,
            transcript: conversation.transcript.clone(),
            proposals: conversation.proposals.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub turn: ConversationTurn,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
}

/// Look up a conversation entry and verify ownership. Neither step touches
/// the conversation mutex, so this works even while a resolve is in flight.
async fn conversation_entry(
    state: &AppState,
    user: &CurrentUser,
    conversation_id: Uuid,
) -> Result<Arc<ConversationEntry>, ApiError> {
    let entry = state
        .conversations
        .read()
        .await
        .get(&conversation_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound("Conversation not found".to_string()))?;
    if entry.user_id != user.id {
        return Err(ApiError::NotFound("Conversation not found".to_string()));
    }
    Ok(entry)
}

pub async fn open_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<ResponseJson<ApiResponse<ConversationView>>, ApiError> {
    let conversation = state.assistant.open_conversation(user.id).await;
    let view = ConversationView::of(&conversation);

    state
        .conversations
        .write()
        .await
        .insert(conversation.id, Arc::new(ConversationEntry::new(conversation)));

    tracing::debug!("conversation {} opened for user {}", view.id, user.id);
    Ok(ResponseJson(ApiResponse::success(view)))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<ConversationView>>, ApiError> {
    let entry = conversation_entry(&state, &user, conversation_id).await?;
    let conversation = entry.conversation.lock().await;
    Ok(ResponseJson(ApiResponse::success(ConversationView::of(
        &conversation,
    ))))
}

/// One message turn. A conversation handles at most one resolve at a time;
/// a message sent while another is in flight is rejected with 409 instead
/// of being queued.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(conversation_id): Path<Uuid>,
    ResponseJson(req): ResponseJson<SendMessageRequest>,
) -> Result<ResponseJson<ApiResponse<MessageResponse>>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }

    let entry = conversation_entry(&state, &user, conversation_id).await?;
    let mut conversation = entry.conversation.try_lock().map_err(|_| {
        ApiError::Conflict("The assistant is still working on the previous message".to_string())
    })?;

    let handled = state
        .assistant
        .handle_message(&mut conversation, &req.message)
        .await;

    // The surface may have been closed while the backend call was running.
    // Its state is already unreachable; don't report a result for it.
    if !state
        .conversations
        .read()
        .await
        .contains_key(&conversation_id)
    {
        return Err(ApiError::NotFound("Conversation not found".to_string()));
    }

    Ok(ResponseJson(ApiResponse::success(MessageResponse {
        turn: handled.turn,
        proposal: handled.proposal,
    })))
}

pub async fn confirm_proposal(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((conversation_id, proposal_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<MessageResponse>>, ApiError> {
    let entry = conversation_entry(&state, &user, conversation_id).await?;
    let mut conversation = entry.conversation.try_lock().map_err(|_| {
        ApiError::Conflict("The assistant is still working on the previous message".to_string())
    })?;

    let turn = state
        .assistant
        .confirm(&mut conversation, proposal_id)
        .await?;

    Ok(ResponseJson(ApiResponse::success(MessageResponse {
        turn,
        proposal: conversation.proposal(proposal_id).cloned(),
    })))
}

pub async fn dismiss_proposal(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((conversation_id, proposal_id)): Path<(Uuid, Uuid)>,
) -> Result<ResponseJson<ApiResponse<Proposal>>, ApiError> {
    let entry = conversation_entry(&state, &user, conversation_id).await?;
    let mut conversation = entry.conversation.lock().await;

    let proposal = conversation
        .proposal_mut(proposal_id)
        .ok_or_else(|| ApiError::NotFound(format!("Proposal {} not found", proposal_id)))?;
    proposal.dismiss();
    let proposal = proposal.clone();

    Ok(ResponseJson(ApiResponse::success(proposal)))
}

pub async fn close_conversation(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(conversation_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    conversation_entry(&state, &user, conversation_id).await?;
    state.conversations.write().await.remove(&conversation_id);
    tracing::debug!("conversation {} closed", conversation_id);
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assistant/conversations", post(open_conversation))
        .route(
            "/assistant/conversations/{conversation_id}",
            get(get_conversation),
        )
        .route(
            "/assistant/conversations/{conversation_id}",
            delete(close_conversation),
        )
        .route(
            "/assistant/conversations/{conversation_id}/messages",
            post(send_message),
        )
        .route(
            "/assistant/conversations/{conversation_id}/proposals/{proposal_id}/confirm",
            post(confirm_proposal),
        )
        .route(
            "/assistant/conversations/{conversation_id}/proposals/{proposal_id}/dismiss",
            post(dismiss_proposal),
        )
}
