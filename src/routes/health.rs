use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{response::ApiResponse, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    status: String,
    database: bool,
    realtime_subscribers: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and database status", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .is_ok();
    if !database {
        tracing::warn!("health check could not reach the database");
    }

    let data = HealthData {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        realtime_subscribers: state.notifier.receiver_count(),
    };

    Json(ApiResponse::ok("Health check", data))
}
