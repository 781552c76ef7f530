use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
    Extension, Router,
};
use db::models::project::{CreateProject, Project};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, middleware::CurrentUser, AppState};

pub async fn get_projects(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = Project::find_by_user_id(&state.db.pool, user.id).await?;
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(project_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = Project::find_by_id(&state.db.pool, project_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ResponseJson(payload): ResponseJson<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }
    if Project::find_by_name(&state.db.pool, user.id, &payload.name)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "A project with this name already exists".to_string(),
        ));
    }
    let project = Project::create(&state.db.pool, user.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(get_projects))
        .route("/projects", post(create_project))
        .route("/projects/{project_id}", get(get_project))
}
