//! Guest self-service at a table. The guest proves presence with the table
//! number and the PIN of an open comanda, then acts on that comanda only.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};

use crate::{
    domain::status::ComandaStatus,
    dto::{
        auth::TableClaims,
        pdv::AddComandaItemRequest,
        table_menu::{TableLoginRequest, TableLoginResponse},
    },
    entity::{
        comandas::{Column as ComandaCol, Entity as Comandas, Model as ComandaModel},
        dining_tables::{Column as TableCol, Entity as DiningTables},
    },
    error::{AppError, AppResult},
    middleware::auth::{TableSession, sign_token},
    models::ComandaDetail,
    response::ApiResponse,
    services::{auth_service, detail, pdv_service},
    state::AppState,
};

const SESSION_HOURS: i64 = 12;

pub async fn login(
    state: &AppState,
    payload: TableLoginRequest,
) -> AppResult<ApiResponse<TableLoginResponse>> {
    let number = payload.table_number.trim();
    let pin = payload.pin.trim();
    if number.is_empty() || pin.is_empty() {
        return Err(AppError::BadRequest("table_number and pin are required".into()));
    }

    let table = DiningTables::find()
        .filter(TableCol::TableNumber.eq(number))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let comanda = Comandas::find()
        .filter(ComandaCol::TableId.eq(table.id))
        .filter(ComandaCol::Status.eq(ComandaStatus::Open.as_str()))
        .filter(ComandaCol::AccessPin.eq(pin))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid PIN or no open comanda".into()))?;

    let claims = TableClaims {
        table_id: table.id,
        comanda_id: comanda.id,
        exp: auth_service::expiry_after(SESSION_HOURS)?,
    };
    let token = sign_token(&claims)?;

    tracing::info!(table_id = %table.id, comanda_id = %comanda.id, "table session started");
    Ok(ApiResponse::ok(
        format!("Welcome to table {}", table.table_number),
        TableLoginResponse {
            token,
            table_id: table.id,
            table_number: table.table_number,
            comanda_id: comanda.id,
            comanda_number: comanda.comanda_number,
        },
    ))
}

/// The session's comanda, as long as it is still open and still at the table.
async fn session_comanda(state: &AppState, session: &TableSession) -> AppResult<ComandaModel> {
    let comanda = Comandas::find_by_id(session.comanda_id)
        .one(&state.orm)
        .await?
        .filter(|c| c.table_id == Some(session.table_id))
        .ok_or(AppError::NotFound)?;
    if comanda.status != ComandaStatus::Open.as_str() {
        return Err(AppError::Unauthorized("Comanda is no longer open".into()));
    }
    Ok(comanda)
}

pub async fn comanda(
    state: &AppState,
    session: &TableSession,
) -> AppResult<ApiResponse<ComandaDetail>> {
    let comanda = session_comanda(state, session).await?;
    Ok(ApiResponse::ok(
        "Comanda",
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}

pub async fn add_item(
    state: &AppState,
    session: &TableSession,
    payload: AddComandaItemRequest,
) -> AppResult<ApiResponse<ComandaDetail>> {
    session_comanda(state, session).await?;

    let txn = state.orm.begin().await?;
    let (comanda, item) = pdv_service::add_comanda_item(&txn, session.comanda_id, &payload).await?;
    txn.commit().await?;

    pdv_service::publish_item_added(state, &comanda, &item);
    Ok(ApiResponse::ok(
        "Item added",
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}
