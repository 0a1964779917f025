//! Guest self-service at a table, authenticated with a table token.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use crate::{
    dto::{
        pdv::AddComandaItemRequest,
        table_menu::{TableLoginRequest, TableLoginResponse},
    },
    error::AppResult,
    middleware::auth::TableSession,
    models::ComandaDetail,
    response::ApiResponse,
    services::table_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/comanda", get(comanda))
        .route("/itens", post(add_item))
}

#[utoipa::path(
    post,
    path = "/api/mesa/login",
    request_body = TableLoginRequest,
    responses(
        (status = 200, description = "Table token for the comanda", body = ApiResponse<TableLoginResponse>),
        (status = 401, description = "Wrong table or PIN")
    ),
    tag = "Table"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<TableLoginRequest>,
) -> AppResult<Json<ApiResponse<TableLoginResponse>>> {
    let resp = table_service::login(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/mesa/comanda",
    responses(
        (status = 200, description = "Current comanda", body = ApiResponse<ComandaDetail>),
        (status = 401, description = "Comanda no longer open")
    ),
    security(("bearer_auth" = [])),
    tag = "Table"
)]
pub async fn comanda(
    State(state): State<AppState>,
    session: TableSession,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = table_service::comanda(&state, &session).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/mesa/itens",
    request_body = AddComandaItemRequest,
    responses(
        (status = 200, description = "Item ordered from the table", body = ApiResponse<ComandaDetail>),
        (status = 422, description = "Insufficient stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Table"
)]
pub async fn add_item(
    State(state): State<AppState>,
    session: TableSession,
    Json(payload): Json<AddComandaItemRequest>,
) -> AppResult<Json<ApiResponse<ComandaDetail>>> {
    let resp = table_service::add_item(&state, &session, payload).await?;
    Ok(Json(resp))
}
