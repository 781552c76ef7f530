use axum::{
    extract::State,
    http::HeaderMap,
    response::Json as ResponseJson,
    routing::post,
    Extension, Router,
};
use db::{
    models::user::{Session, User},
    services::AuthService,
};
use serde::{Deserialize, Serialize};
use utils::response::ApiResponse;

use crate::{
    error::ApiError,
    middleware::{bearer_token, CurrentUser},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    /// Raw session token. Shown once; only its hash is stored.
    pub token: String,
}

pub async fn signup(
    State(state): State<AppState>,
    ResponseJson(req): ResponseJson<SignupRequest>,
) -> Result<ResponseJson<ApiResponse<AuthResponse>>, ApiError> {
    if req.username.trim().is_empty() || req.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "Username must be non-empty and password at least 8 characters".to_string(),
        ));
    }

    if User::find_by_username(&state.db.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password)
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))?;
    let user = User::create(&state.db.pool, &req.username, &req.email, &password_hash).await?;

    let token = AuthService::generate_session_token();
    Session::create(&state.db.pool, user.id, &AuthService::hash_session_token(&token)).await?;

    tracing::info!("new user signed up: {}", user.username);
    Ok(ResponseJson(ApiResponse::success(AuthResponse {
        user,
        token,
    })))
}

pub async fn login(
    State(state): State<AppState>,
    ResponseJson(req): ResponseJson<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthResponse>>, ApiError> {
    let user = User::find_by_username(&state.db.pool, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let is_valid = AuthService::verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))?;
    if !is_valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = AuthService::generate_session_token();
    Session::create(&state.db.pool, user.id, &AuthService::hash_session_token(&token)).await?;

    Ok(ResponseJson(ApiResponse::success(AuthResponse {
        user,
        token,
    })))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    // The session middleware has already validated this token.
    if let Some(token) = bearer_token(&headers) {
        Session::delete_by_token_hash(&state.db.pool, &AuthService::hash_session_token(token))
            .await?;
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<ResponseJson<ApiResponse<User>>, ApiError> {
    let user = User::find_by_id(&state.db.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(user)))
}

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", axum::routing::get(me))
}
