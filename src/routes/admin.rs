use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::{
            ActionOutcome, AddNoteRequest, ConfirmPaymentRequest, EstimatedTimeRequest,
            InventoryAdjustRequest, LowStockList, LowStockQuery, OrderStatistics,
            RejectOrderRequest, UpdateOrderStatusRequest,
        },
        orders::OrderList,
        settings::UpdateSettingsRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Order, OrderDetail, OrderNote, Product},
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::admin_service,
    settings::StoreSettings,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pedidos", get(list_all_orders))
        .route("/pedidos/{id}", get(get_order_admin))
        .route("/pedidos/{id}/status", patch(update_order_status))
        .route("/pedidos/{id}/aceitar", post(accept_order))
        .route("/pedidos/{id}/rejeitar", post(reject_order))
        .route("/pedidos/{id}/tempo", patch(update_estimated_time))
        .route("/pedidos/{id}/notas", post(add_note))
        .route("/pedidos/{id}/confirmar-pagamento", post(confirm_payment))
        .route("/estatisticas", get(order_statistics))
        .route("/estoque/baixo", get(list_low_stock))
        .route("/estoque/{id}", patch(adjust_inventory))
        .route("/configuracoes", get(get_settings).put(update_settings))
}

#[utoipa::path(
    get,
    path = "/api/admin/pedidos",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/pedidos/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with items, history and internal notes", body = ApiResponse<OrderDetail>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/pedidos/{id}/status",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status changed, or unchanged when already set", body = ApiResponse<ActionOutcome>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pedidos/{id}/aceitar",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Pending order confirmed", body = ApiResponse<ActionOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn accept_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = admin_service::accept_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pedidos/{id}/rejeitar",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = RejectOrderRequest,
    responses(
        (status = 200, description = "Pending order cancelled", body = ApiResponse<ActionOutcome>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn reject_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectOrderRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = admin_service::reject_order(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/pedidos/{id}/tempo",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = EstimatedTimeRequest,
    responses(
        (status = 200, description = "Estimated times updated", body = ApiResponse<Order>),
        (status = 400, description = "Non-positive estimate"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_estimated_time(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EstimatedTimeRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_estimated_time(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pedidos/{id}/notas",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = AddNoteRequest,
    responses(
        (status = 200, description = "Note attached", body = ApiResponse<OrderNote>),
        (status = 400, description = "Empty note"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNoteRequest>,
) -> AppResult<Json<ApiResponse<OrderNote>>> {
    let resp = admin_service::add_note(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/pedidos/{id}/confirmar-pagamento",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment approved manually", body = ApiResponse<ActionOutcome>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<ActionOutcome>>> {
    let resp = admin_service::confirm_payment(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/estatisticas",
    responses(
        (status = 200, description = "Order counts and revenue", body = ApiResponse<OrderStatistics>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn order_statistics(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderStatistics>>> {
    let resp = admin_service::order_statistics(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/estoque/baixo",
    params(
        ("threshold" = Option<i32>, Query, description = "Stock threshold, default 10"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "Active products below the threshold", body = ApiResponse<LowStockList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<LowStockList>>> {
    let resp = admin_service::list_low_stock(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/estoque/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = InventoryAdjustRequest,
    responses(
        (status = 200, description = "Stock adjusted", body = ApiResponse<Product>),
        (status = 400, description = "Zero delta"),
        (status = 422, description = "Stock would go negative"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InventoryAdjustRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = admin_service::adjust_inventory(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/configuracoes",
    responses(
        (status = 200, description = "Store settings", body = ApiResponse<StoreSettings>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    let resp = admin_service::get_settings(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/configuracoes",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings saved", body = ApiResponse<StoreSettings>),
        (status = 400, description = "Invalid value"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> AppResult<Json<ApiResponse<StoreSettings>>> {
    let resp = admin_service::update_settings(&state, &user, payload).await?;
    Ok(Json(resp))
}
