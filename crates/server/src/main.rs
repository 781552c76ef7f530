use std::sync::Arc;

use assistant::{Assistant, LlmBackend, OpenAiBackend};
use db::DBService;
use server::{routes, store::SqliteTaskStore, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,server={level},db={level},assistant={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string)?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tasknest.db".to_string());
    let db = DBService::new(&database_url).await?;
    tracing::info!("database ready at {}", database_url);

    let backend = OpenAiBackend::from_env();
    if backend.is_configured() {
        tracing::info!("assistant backend: {}", backend.name());
    } else {
        tracing::warn!(
            "no LLM API key configured; assistant requests will fail until OPENAI_API_KEY is set"
        );
    }

    let store = Arc::new(SqliteTaskStore::new(db.clone()));
    let assistant = Assistant::new(Arc::new(backend), store);
    let state = AppState::new(db, assistant);

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, routes::router(state)).await?;

    Ok(())
}
