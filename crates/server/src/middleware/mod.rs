use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use db::{models::user::Session, services::AuthService};
use uuid::Uuid;

use crate::{error::ApiError, AppState};

/// The authenticated caller, inserted as a request extension by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Pull the bearer token out of the `Authorization` header, if present.
pub fn bearer_token(request_headers: &axum::http::HeaderMap) -> Option<&str> {
    request_headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Rejects requests that do not carry a valid, unexpired session token.
/// Only the token's hash is compared against the sessions table.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let token_hash = AuthService::hash_session_token(token);
    let session = Session::find_valid_by_token_hash(&state.db.pool, &token_hash)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

    request.extensions_mut().insert(CurrentUser {
        id: session.user_id,
    });
    Ok(next.run(request).await)
}
