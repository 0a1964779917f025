use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::ActionOutcome,
        kitchen::{ComandaItemStatusRequest, KitchenBoard, KitchenOrderStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{ComandaItem, OrderItem},
    response::ApiResponse,
    services::kitchen_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board))
        .route("/pedidos/{id}/status", patch(update_order_status))
        .route(
            "/pedidos/{order_id}/itens/{item_id}/status",
            patch(update_order_item_status),
        )
        .route(
            "/comanda-itens/{id}/status",
            patch(update_comanda_item_status),
        )
}

#[utoipa::path(
    get,
    path = "/api/cozinha",
    responses(
        (status = 200, description = "Orders in preparation and pending comanda items", body = ApiResponse<KitchenBoard>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn board(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<KitchenBoard>>> {
    let resp = kitchen_service::board(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cozinha/pedidos/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = KitchenOrderStatusRequest,
    responses(
        (status = 200, description = "Order moved along the kitchen flow", body = ApiResponse<ActionOutcome>),
        (status = 400, description = "Status not allowed for the kitchen"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<KitchenOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = kitchen_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cozinha/pedidos/{order_id}/itens/{item_id}/status",
    params(
        ("order_id" = Uuid, Path, description = "Order ID"),
        ("item_id" = Uuid, Path, description = "Order item ID")
    ),
    request_body = KitchenOrderStatusRequest,
    responses(
        (status = 200, description = "Item status updated", body = ApiResponse<OrderItem>),
        (status = 400, description = "Status not allowed for items"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn update_order_item_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path((order_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<KitchenOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp =
        kitchen_service::update_order_item_status(&state, &user, order_id, item_id, payload)
            .await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cozinha/comanda-itens/{id}/status",
    params(("id" = Uuid, Path, description = "Comanda item ID")),
    request_body = ComandaItemStatusRequest,
    responses(
        (status = 200, description = "Comanda item status updated", body = ApiResponse<ComandaItem>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Kitchen"
)]
pub async fn update_comanda_item_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ComandaItemStatusRequest>,
) -> AppResult<Json<ApiResponse<ComandaItem>>> {
    let resp = kitchen_service::update_comanda_item_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
