//! Point-of-sale endpoints for waiters and cashiers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        pdv::{
            AddComandaItemRequest, CashMovementRequest, CloseComandaRequest,
            CloseRegisterRequest, ClosedRegister, ComandaList, CreateComandaRequest,
            CreateTableRequest, OpenRegisterRequest, RegisterHistory, RegisterSummary, TableList,
            TableStatusRequest,
        },
        table_menu::TableAccess,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{CashMovement, ComandaDetail, DiningTable},
    response::ApiResponse,
    services::pdv_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mesas", get(list_tables).post(create_table))
        .route("/mesas/{id}/abrir", post(open_table))
        .route("/mesas/{id}/fechar", post(close_table))
        .route("/mesas/{id}/status", patch(set_table_status))
        .route("/mesas/{id}/acesso", get(table_access))
        .route("/comandas", get(list_open_comandas).post(create_comanda))
        .route("/comandas/{id}", get(get_comanda))
        .route("/comandas/{id}/itens", post(add_item))
        .route("/comandas/{id}/itens/{item_id}", delete(remove_item))
        .route("/comandas/{id}/fechar", post(close_comanda))
        .route("/caixa", get(current_register))
        .route("/caixa/abrir", post(open_cash_register))
        .route("/caixa/fechar", post(close_cash_register))
        .route("/caixa/movimentos", post(add_movement))
        .route("/caixa/historico", get(register_history))
}

#[utoipa::path(
    get,
    path = "/api/pdv/mesas",
    responses((status = 200, description = "Dining tables", body = ApiResponse<TableList>)),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TableList>>> {
    let resp = pdv_service::list_tables(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/mesas",
    request_body = CreateTableRequest,
    responses(
        (status = 200, description = "Table created", body = ApiResponse<DiningTable>),
        (status = 422, description = "Table number already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn create_table(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTableRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = pdv_service::create_table(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/mesas/{id}/abrir",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table occupied with a fresh PIN", body = ApiResponse<DiningTable>),
        (status = 422, description = "Table is not free")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn open_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = pdv_service::open_table(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/mesas/{id}/fechar",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses(
        (status = 200, description = "Table freed", body = ApiResponse<DiningTable>),
        (status = 422, description = "Table still has open comandas")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn close_table(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = pdv_service::close_table(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/pdv/mesas/{id}/status",
    params(("id" = Uuid, Path, description = "Table ID")),
    request_body = TableStatusRequest,
    responses(
        (status = 200, description = "Status set", body = ApiResponse<DiningTable>),
        (status = 400, description = "Occupied is reserved for opening a table"),
        (status = 422, description = "Table is occupied")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn set_table_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TableStatusRequest>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let resp = pdv_service::set_table_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pdv/mesas/{id}/acesso",
    params(("id" = Uuid, Path, description = "Table ID")),
    responses((status = 200, description = "Self-service link for the table", body = ApiResponse<TableAccess>)),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn table_access(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TableAccess>>> {
    let resp = pdv_service::table_access(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pdv/comandas",
    responses((status = 200, description = "Open comandas", body = ApiResponse<ComandaList>)),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn list_open_comandas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ComandaList>>> {
    let resp = pdv_service::list_open_comandas(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/comandas",
    request_body = CreateComandaRequest,
    responses(
        (status = 200, description = "Comanda opened", body = ApiResponse<ComandaDetail>),
        (status = 422, description = "Table not occupied, or number collision")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn create_comanda(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateComandaRequest>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = pdv_service::create_comanda(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pdv/comandas/{id}",
    params(("id" = Uuid, Path, description = "Comanda ID")),
    responses(
        (status = 200, description = "Comanda with items", body = ApiResponse<ComandaDetail>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn get_comanda(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = pdv_service::get_comanda(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/comandas/{id}/itens",
    params(("id" = Uuid, Path, description = "Comanda ID")),
    request_body = AddComandaItemRequest,
    responses(
        (status = 200, description = "Item added and total recomputed", body = ApiResponse<ComandaDetail>),
        (status = 422, description = "Comanda closed or insufficient stock")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddComandaItemRequest>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = pdv_service::add_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/pdv/comandas/{id}/itens/{item_id}",
    params(
        ("id" = Uuid, Path, description = "Comanda ID"),
        ("item_id" = Uuid, Path, description = "Comanda item ID")
    ),
    responses(
        (status = 200, description = "Item removed and total recomputed", body = ApiResponse<ComandaDetail>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = pdv_service::remove_item(&state, &user, id, item_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/comandas/{id}/fechar",
    params(("id" = Uuid, Path, description = "Comanda ID")),
    request_body = CloseComandaRequest,
    responses(
        (status = 200, description = "Comanda closed, sale recorded in the open register", body = ApiResponse<ComandaDetail>),
        (status = 422, description = "Comanda already closed")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn close_comanda(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CloseComandaRequest>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = pdv_service::close_comanda(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pdv/caixa",
    responses(
        (status = 200, description = "Open register with movements, data is null when none is open", body = ApiResponse<RegisterSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn current_register(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Option<RegisterSummary>>>> {
    let resp = pdv_service::current_register(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/caixa/abrir",
    request_body = OpenRegisterRequest,
    responses(
        (status = 200, description = "Register opened", body = ApiResponse<RegisterSummary>),
        (status = 422, description = "A register is already open")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn open_cash_register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<OpenRegisterRequest>,
) -> AppResult<Json<ApiResponse<RegisterSummary>>> {
    let resp = pdv_service::open_cash_register(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/caixa/fechar",
    request_body = CloseRegisterRequest,
    responses(
        (status = 200, description = "Register closed with reconciliation", body = ApiResponse<ClosedRegister>),
        (status = 422, description = "No open register")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn close_cash_register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CloseRegisterRequest>,
) -> AppResult<Json<ApiResponse<ClosedRegister>>> {
    let resp = pdv_service::close_cash_register(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/pdv/caixa/movimentos",
    request_body = CashMovementRequest,
    responses(
        (status = 200, description = "Movement recorded", body = ApiResponse<CashMovement>),
        (status = 400, description = "Non-positive amount"),
        (status = 422, description = "No open register")
    ),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn add_movement(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CashMovementRequest>,
) -> AppResult<Json<ApiResponse<CashMovement>>> {
    let resp = pdv_service::add_movement(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/pdv/caixa/historico",
    responses((status = 200, description = "Last closed registers", body = ApiResponse<RegisterHistory>)),
    security(("bearer_auth" = [])),
    tag = "PDV"
)]
pub async fn register_history(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<RegisterHistory>>> {
    let resp = pdv_service::register_history(&state, &user).await?;
    Ok(Json(resp))
}
