use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payment::{PaymentWebhook, WebhookAck},
    error::AppResult,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(webhook))
}

#[utoipa::path(
    post,
    path = "/api/pagamento/webhook",
    request_body = PaymentWebhook,
    responses(
        (status = 200, description = "Notification acknowledged", body = ApiResponse<WebhookAck>),
        (status = 404, description = "Unknown order")
    ),
    tag = "Payment"
)]
pub async fn webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let resp = payment_service::handle_webhook(&state, payload).await?;
    Ok(Json(resp))
}
