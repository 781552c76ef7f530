use axum::{extract::State, response::Json as ResponseJson, routing::get, Extension, Router};
use db::models::task::TaskStatus;
use serde::Serialize;
use sqlx::FromRow;
use utils::response::ApiResponse;

use crate::{error::ApiError, middleware::CurrentUser, AppState};

#[derive(Debug, FromRow, Serialize)]
pub struct StatusCount {
    pub status: TaskStatus,
    pub count: i64,
}

/// Completed-vs-total counts per calendar month of creation.
#[derive(Debug, FromRow, Serialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub completed: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct TaskStats {
    pub distribution: Vec<StatusCount>,
    pub trend: Vec<MonthlyTrend>,
    pub total: i64,
    pub completed: i64,
    /// Open tasks due within the next seven days.
    pub due_soon: i64,
    /// Share of tasks completed, as a whole percentage.
    pub efficiency: i64,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<ResponseJson<ApiResponse<TaskStats>>, ApiError> {
    let distribution = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM tasks WHERE user_id = $1 GROUP BY status",
    )
    .bind(user.id)
    .fetch_all(&state.db.pool)
    .await?;

    let trend = sqlx::query_as::<_, MonthlyTrend>(
        r#"SELECT strftime('%Y-%m', created_at) AS month,
                  SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END) AS completed,
                  COUNT(*) AS total
           FROM tasks
           WHERE user_id = $1
           GROUP BY strftime('%Y-%m', created_at)
           ORDER BY month"#,
    )
    .bind(user.id)
    .fetch_all(&state.db.pool)
    .await?;

    let now = chrono::Utc::now();
    let due_soon = sqlx::query_scalar::<_, i64>(
        r#"SELECT COUNT(*) FROM tasks
           WHERE user_id = $1 AND status != 'completed'
             AND due_date IS NOT NULL AND due_date BETWEEN $2 AND $3"#,
    )
    .bind(user.id)
    .bind(now)
    .bind(now + chrono::Duration::days(7))
    .fetch_one(&state.db.pool)
    .await?;

    let total: i64 = distribution.iter().map(|d| d.count).sum();
    let completed = distribution
        .iter()
        .find(|d| d.status == TaskStatus::Completed)
        .map(|d| d.count)
        .unwrap_or(0);
    let efficiency = if total > 0 {
        (completed as f64 / total as f64 * 100.0).round() as i64
    } else {
        0
    };

    Ok(ResponseJson(ApiResponse::success(TaskStats {
        distribution,
        trend,
        total,
        completed,
        due_soon,
        efficiency,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}
