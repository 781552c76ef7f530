use axum::{
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, IntoMakeService},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{middleware as app_middleware, AppState};

pub mod assistant;
pub mod auth;
pub mod projects;
pub mod stats;
pub mod tasks;

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub fn router(state: AppState) -> IntoMakeService<Router> {
    let protected_routes = Router::new()
        .merge(auth::protected_router())
        .merge(tasks::router())
        .merge(projects::router())
        .merge(stats::router())
        .merge(assistant::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::require_session,
        ));

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_router())
        .merge(protected_routes)
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .into_make_service()
}
