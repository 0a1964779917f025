use chrono::Utc;
use password_hash::rand_core::{OsRng, RngCore};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        cash::{self, MovementKind, Reconciliation},
        money::format_brl,
        pricing::PricedLine,
        status::{ComandaItemStatus, ComandaStatus, TableStatus},
    },
    dto::{
        pdv::{
            AddComandaItemRequest, CashMovementRequest, CloseComandaRequest, CloseRegisterRequest,
            ClosedRegister, ComandaList, CreateComandaRequest, CreateTableRequest,
            OpenRegisterRequest, RegisterHistory, RegisterSummary, TableList, TableStatusRequest,
        },
        table_menu::TableAccess,
    },
    entity::{
        cash_movements::{ActiveModel as MovementActive, Column as MovementCol, Entity as CashMovements},
        cash_registers::{
            ActiveModel as RegisterActive, Column as RegisterCol, Entity as CashRegisters,
            Model as RegisterModel,
        },
        comanda_item_extras::{
            ActiveModel as ComandaExtraActive, Column as ComandaExtraCol, Entity as ComandaItemExtras,
        },
        comanda_items::{
            ActiveModel as ComandaItemActive, Column as ComandaItemCol, Entity as ComandaItems,
            Model as ComandaItemModel,
        },
        comandas::{ActiveModel as ComandaActive, Column as ComandaCol, Entity as Comandas, Model as ComandaModel},
        dining_tables::{ActiveModel as TableActive, Column as TableCol, Entity as DiningTables},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability},
    models::{CashMovement, ComandaDetail, DiningTable},
    response::ApiResponse,
    services::{cart_service, detail},
    state::AppState,
};

const DEFAULT_CAPACITY: i32 = 4;
const REGISTER_HISTORY: u64 = 10;
const DEFAULT_PAYMENT_METHOD: &str = "Dinheiro";
const PIN_ATTEMPTS: usize = 20;

fn pin_from(seed: u32) -> String {
    format!("{:04}", seed % 10_000)
}

fn fresh_pin() -> String {
    pin_from(OsRng.next_u32())
}

fn comanda_number(existing: u64) -> String {
    format!("{:06}", existing + 1)
}

// ---- tables ----

pub async fn create_table(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTableRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let number = payload.table_number.trim().to_string();
    if number.is_empty() {
        return Err(AppError::BadRequest("table_number is required".into()));
    }
    let capacity = payload.capacity.unwrap_or(DEFAULT_CAPACITY);
    if capacity <= 0 {
        return Err(AppError::BadRequest("capacity must be positive".into()));
    }

    let table = TableActive {
        id: Set(Uuid::new_v4()),
        table_number: Set(number),
        capacity: Set(capacity),
        status: Set(TableStatus::Available.as_str().to_string()),
        current_order_id: Set(None),
        opened_at: Set(None),
        waiter_id: Set(None),
        access_pin: Set(Some(fresh_pin())),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Table already exists"))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "table_create",
        "dining_tables",
        json!({ "table_id": table.id, "table_number": table.table_number }),
    )
    .await;

    Ok(ApiResponse::ok("Table created", table.into()))
}

pub async fn list_tables(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<TableList>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let items = DiningTables::find()
        .order_by_asc(TableCol::TableNumber)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DiningTable::from)
        .collect();
    Ok(ApiResponse::ok("Tables", TableList { items }))
}

pub async fn open_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_capability(user, Capability::OperatePdv)?;

    let txn = state.orm.begin().await?;
    let table = DiningTables::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if table.status == TableStatus::Occupied.as_str() {
        return Err(AppError::business(format!(
            "Table {} is already occupied",
            table.table_number
        )));
    }

    let mut active: TableActive = table.into();
    active.status = Set(TableStatus::Occupied.as_str().to_string());
    active.opened_at = Set(Some(Utc::now().into()));
    active.waiter_id = Set(Some(user.user_id));
    active.access_pin = Set(Some(fresh_pin()));
    let table = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(table_id = %table.id, waiter_id = %user.user_id, "table opened");
    Ok(ApiResponse::ok(
        format!("Table {} opened", table.table_number),
        table.into(),
    ))
}

pub async fn close_table(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_capability(user, Capability::OperatePdv)?;

    let txn = state.orm.begin().await?;
    let table = DiningTables::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let open_comandas = Comandas::find()
        .filter(ComandaCol::TableId.eq(table.id))
        .filter(ComandaCol::Status.eq(ComandaStatus::Open.as_str()))
        .count(&txn)
        .await?;
    if open_comandas > 0 {
        return Err(AppError::business(
            "Close all comandas before closing the table",
        ));
    }

    let mut active: TableActive = table.into();
    active.status = Set(TableStatus::Available.as_str().to_string());
    active.opened_at = Set(None);
    active.waiter_id = Set(None);
    active.current_order_id = Set(None);
    active.access_pin = Set(None);
    let table = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(table_id = %table.id, "table closed");
    Ok(ApiResponse::ok(
        format!("Table {} closed", table.table_number),
        table.into(),
    ))
}

pub async fn set_table_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: TableStatusRequest,
) -> AppResult<ApiResponse<DiningTable>> {
    ensure_capability(user, Capability::OperatePdv)?;
    if payload.status == TableStatus::Occupied {
        return Err(AppError::BadRequest(
            "Tables become occupied by opening them".into(),
        ));
    }

    let table = DiningTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if table.status == TableStatus::Occupied.as_str() {
        return Err(AppError::business("Close the table before changing its status"));
    }

    let mut active: TableActive = table.into();
    active.status = Set(payload.status.as_str().to_string());
    let table = active.update(&state.orm).await?;
    Ok(ApiResponse::ok("Table status updated", table.into()))
}

/// Link encoded in the QR code printed on the table.
pub async fn table_access(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TableAccess>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let table = DiningTables::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let access_url = format!("{}/mesa?numero={}", state.public_base_url, table.table_number);
    Ok(ApiResponse::ok(
        "Table access",
        TableAccess {
            table_number: table.table_number,
            access_url,
        },
    ))
}

// ---- comandas ----

/// A PIN no other open comanda at the table is using.
async fn unused_pin<C: ConnectionTrait>(conn: &C, table_id: Option<Uuid>) -> AppResult<String> {
    let Some(table_id) = table_id else {
        return Ok(fresh_pin());
    };
    let taken: Vec<Option<String>> = Comandas::find()
        .select_only()
        .column(ComandaCol::AccessPin)
        .filter(ComandaCol::TableId.eq(table_id))
        .filter(ComandaCol::Status.eq(ComandaStatus::Open.as_str()))
        .into_tuple()
        .all(conn)
        .await?;
    for _ in 0..PIN_ATTEMPTS {
        let pin = fresh_pin();
        if !taken.iter().flatten().any(|t| *t == pin) {
            return Ok(pin);
        }
    }
    Err(AppError::business("Could not allocate a PIN for this table"))
}

pub async fn create_comanda(
    state: &AppState,
    user: &AuthUser,
    payload: CreateComandaRequest,
) -> AppResult<ApiResponse<ComandaDetail>> {
    ensure_capability(user, Capability::OperatePdv)?;

    let txn = state.orm.begin().await?;
    if let Some(table_id) = payload.table_id {
        DiningTables::find_by_id(table_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
    }

    let existing = Comandas::find().count(&txn).await?;
    let pin = unused_pin(&txn, payload.table_id).await?;
    let comanda = ComandaActive {
        id: Set(Uuid::new_v4()),
        comanda_number: Set(comanda_number(existing)),
        table_id: Set(payload.table_id),
        customer_name: Set(payload.customer_name.filter(|n| !n.trim().is_empty())),
        status: Set(ComandaStatus::Open.as_str().to_string()),
        total: Set(0),
        opened_at: NotSet,
        closed_at: Set(None),
        waiter_id: Set(Some(user.user_id)),
        access_pin: Set(Some(pin)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "Comanda number already taken, try again"))?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "comanda_create",
        "comandas",
        json!({ "comanda_id": comanda.id, "comanda_number": comanda.comanda_number }),
    )
    .await;

    let message = format!("Comanda #{} created", comanda.comanda_number);
    let detail = detail::comanda_detail(&state.orm, comanda).await?;
    Ok(ApiResponse::ok(message, detail))
}

pub async fn list_open_comandas(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ComandaList>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let items = Comandas::find()
        .filter(ComandaCol::Status.eq(ComandaStatus::Open.as_str()))
        .order_by_asc(ComandaCol::OpenedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::ok("Open comandas", ComandaList { items }))
}

pub async fn get_comanda(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ComandaDetail>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let comanda = Comandas::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::ok(
        "Comanda",
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}

async fn lock_open_comanda<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ComandaModel> {
    let comanda = Comandas::find_by_id(id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    if comanda.status != ComandaStatus::Open.as_str() {
        return Err(AppError::business(format!(
            "Comanda #{} is closed",
            comanda.comanda_number
        )));
    }
    Ok(comanda)
}

/// Sums the comanda's lines and stores the result on the comanda row.
async fn refresh_total<C: ConnectionTrait>(conn: &C, comanda: ComandaModel) -> AppResult<ComandaModel> {
    let items = ComandaItems::find()
        .filter(ComandaItemCol::ComandaId.eq(comanda.id))
        .all(conn)
        .await?;
    let item_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
    let extras = if item_ids.is_empty() {
        Vec::new()
    } else {
        ComandaItemExtras::find()
            .filter(ComandaExtraCol::ComandaItemId.is_in(item_ids))
            .all(conn)
            .await?
    };

    let total: i64 = items
        .iter()
        .map(|item| PricedLine {
            unit_price: item.price,
            extras_per_unit: extras
                .iter()
                .filter(|e| e.comanda_item_id == item.id)
                .map(|e| e.price * i64::from(e.quantity))
                .sum(),
            quantity: item.quantity,
        })
        .map(|line| line.total())
        .sum();

    if total == comanda.total {
        return Ok(comanda);
    }
    let mut active: ComandaActive = comanda.into();
    active.total = Set(total);
    Ok(active.update(conn).await?)
}

/// Adds a line to an open comanda. Prices are frozen from the catalog;
/// stock is checked but only checkout consumes it.
pub(crate) async fn add_comanda_item<C: ConnectionTrait>(
    conn: &C,
    comanda_id: Uuid,
    payload: &AddComandaItemRequest,
) -> AppResult<(ComandaModel, ComandaItemModel)> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be at least 1".into()));
    }

    let comanda = lock_open_comanda(conn, comanda_id).await?;
    let product = Products::find_by_id(payload.product_id)
        .one(conn)
        .await?
        .filter(|p| p.active)
        .ok_or(AppError::NotFound)?;
    if product.stock < quantity {
        return Err(AppError::business(format!(
            "Insufficient stock for {}",
            product.name
        )));
    }

    let item = ComandaItemActive {
        id: Set(Uuid::new_v4()),
        comanda_id: Set(comanda.id),
        product_id: Set(product.id),
        quantity: Set(quantity),
        price: Set(product.price),
        status: Set(ComandaItemStatus::Pending.as_str().to_string()),
        sent_to_kitchen: Set(false),
        notes: Set(payload.notes.clone().filter(|n| !n.trim().is_empty())),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;

    for (extra, extra_quantity) in cart_service::resolve_selections(conn, &payload.extras).await? {
        ComandaExtraActive {
            id: Set(Uuid::new_v4()),
            comanda_item_id: Set(item.id),
            extra_id: Set(extra.id),
            quantity: Set(extra_quantity),
            price: Set(extra.price),
        }
        .insert(conn)
        .await?;
    }

    let comanda = refresh_total(conn, comanda).await?;
    Ok((comanda, item))
}

pub(crate) fn publish_item_added(state: &AppState, comanda: &ComandaModel, item: &ComandaItemModel) {
    state.notifier.comanda_item_added(
        comanda.id,
        json!({
            "comanda_id": comanda.id,
            "comanda_number": comanda.comanda_number,
            "table_id": comanda.table_id,
            "item_id": item.id,
            "product_id": item.product_id,
            "quantity": item.quantity,
            "notes": item.notes,
        }),
    );
}

pub async fn add_item(
    state: &AppState,
    user: &AuthUser,
    comanda_id: Uuid,
    payload: AddComandaItemRequest,
) -> AppResult<ApiResponse<ComandaDetail>> {
    ensure_capability(user, Capability::OperatePdv)?;

    let txn = state.orm.begin().await?;
    let (comanda, item) = add_comanda_item(&txn, comanda_id, &payload).await?;
    txn.commit().await?;

    publish_item_added(state, &comanda, &item);
    Ok(ApiResponse::ok(
        "Item added",
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}

pub async fn remove_item(
    state: &AppState,
    user: &AuthUser,
    comanda_id: Uuid,
    item_id: Uuid,
) -> AppResult<ApiResponse<ComandaDetail>> {
    ensure_capability(user, Capability::OperatePdv)?;

    let txn = state.orm.begin().await?;
    let comanda = lock_open_comanda(&txn, comanda_id).await?;
    let item = ComandaItems::find()
        .filter(ComandaItemCol::Id.eq(item_id))
        .filter(ComandaItemCol::ComandaId.eq(comanda.id))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    item.delete(&txn).await?;
    let comanda = refresh_total(&txn, comanda).await?;
    txn.commit().await?;

    Ok(ApiResponse::ok(
        "Item removed",
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}

pub async fn close_comanda(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CloseComandaRequest,
) -> AppResult<ApiResponse<ComandaDetail>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let method = payload
        .payment_method
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

    let txn = state.orm.begin().await?;
    let comanda = lock_open_comanda(&txn, id).await?;
    let comanda = refresh_total(&txn, comanda).await?;

    let mut active: ComandaActive = comanda.into();
    active.status = Set(ComandaStatus::Closed.as_str().to_string());
    active.closed_at = Set(Some(Utc::now().into()));
    let comanda = active.update(&txn).await?;

    let register = CashRegisters::find()
        .filter(RegisterCol::Status.eq(cash::REGISTER_OPEN))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    match register {
        Some(register) if comanda.total > 0 => {
            MovementActive {
                id: Set(Uuid::new_v4()),
                cash_register_id: Set(register.id),
                movement_type: Set(MovementKind::In.as_str().to_string()),
                amount: Set(comanda.total),
                description: Set(Some(format!(
                    "Comanda #{} - {}",
                    comanda.comanda_number, method
                ))),
                order_id: Set(None),
                comanda_id: Set(Some(comanda.id)),
                created_by: Set(Some(user.user_id)),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }
        Some(_) => {}
        None => {
            tracing::debug!(comanda_id = %comanda.id, "comanda closed without an open register");
        }
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "comanda_close",
        "comandas",
        json!({ "comanda_id": comanda.id, "total": comanda.total, "payment_method": method }),
    )
    .await;

    let message = format!(
        "Comanda #{} closed. Total: {}",
        comanda.comanda_number,
        format_brl(comanda.total)
    );
    Ok(ApiResponse::ok(
        message,
        detail::comanda_detail(&state.orm, comanda).await?,
    ))
}

// ---- cash register ----

async fn open_register<C: ConnectionTrait>(conn: &C, lock: bool) -> AppResult<Option<RegisterModel>> {
    let mut finder = CashRegisters::find().filter(RegisterCol::Status.eq(cash::REGISTER_OPEN));
    if lock {
        finder = finder.lock(LockType::Update);
    }
    Ok(finder.one(conn).await?)
}

async fn summarize<C: ConnectionTrait>(conn: &C, register: RegisterModel) -> AppResult<RegisterSummary> {
    let movements = CashMovements::find()
        .filter(MovementCol::CashRegisterId.eq(register.id))
        .order_by_asc(MovementCol::CreatedAt)
        .all(conn)
        .await?;
    let expected_balance = cash::expected_balance(
        register.opening_balance,
        movements
            .iter()
            .filter_map(|m| Some((m.movement_type.parse().ok()?, m.amount))),
    );
    Ok(RegisterSummary {
        register: register.into(),
        movements: movements.into_iter().map(Into::into).collect(),
        expected_balance,
    })
}

pub async fn current_register(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Option<RegisterSummary>>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let summary = match open_register(&state.orm, false).await? {
        Some(register) => Some(summarize(&state.orm, register).await?),
        None => None,
    };
    Ok(ApiResponse::ok("Cash register", summary))
}

pub async fn open_cash_register(
    state: &AppState,
    user: &AuthUser,
    payload: OpenRegisterRequest,
) -> AppResult<ApiResponse<RegisterSummary>> {
    ensure_capability(user, Capability::OperatePdv)?;
    if payload.opening_balance < 0 {
        return Err(AppError::BadRequest("opening_balance must not be negative".into()));
    }

    if open_register(&state.orm, false).await?.is_some() {
        return Err(AppError::business("A cash register is already open"));
    }

    // The partial unique index settles concurrent opens.
    let register = RegisterActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        opening_balance: Set(payload.opening_balance),
        closing_balance: Set(None),
        expected_balance: Set(None),
        difference: Set(None),
        opened_at: NotSet,
        closed_at: Set(None),
        status: Set(cash::REGISTER_OPEN.to_string()),
        notes: Set(payload.notes.filter(|n| !n.trim().is_empty())),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::on_unique_violation(e, "A cash register is already open"))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cash_open",
        "cash_registers",
        json!({ "register_id": register.id, "opening_balance": register.opening_balance }),
    )
    .await;

    Ok(ApiResponse::ok(
        "Cash register opened",
        summarize(&state.orm, register).await?,
    ))
}

pub async fn close_cash_register(
    state: &AppState,
    user: &AuthUser,
    payload: CloseRegisterRequest,
) -> AppResult<ApiResponse<ClosedRegister>> {
    ensure_capability(user, Capability::OperatePdv)?;
    if payload.closing_balance < 0 {
        return Err(AppError::BadRequest("closing_balance must not be negative".into()));
    }

    let txn = state.orm.begin().await?;
    let register = open_register(&txn, true)
        .await?
        .ok_or_else(|| AppError::business("No open cash register"))?;
    let summary = summarize(&txn, register.clone()).await?;
    let reconciliation = Reconciliation::new(summary.expected_balance, payload.closing_balance);

    let notes = match (register.notes.clone(), payload.notes.filter(|n| !n.trim().is_empty())) {
        (Some(opening), Some(closing)) => Some(format!("{opening}\n{closing}")),
        (opening, closing) => closing.or(opening),
    };
    let mut active: RegisterActive = register.into();
    active.closing_balance = Set(Some(reconciliation.counted));
    active.expected_balance = Set(Some(reconciliation.expected));
    active.difference = Set(Some(reconciliation.difference));
    active.closed_at = Set(Some(Utc::now().into()));
    active.status = Set(cash::REGISTER_CLOSED.to_string());
    active.notes = Set(notes);
    let register = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        register_id = %register.id,
        expected = reconciliation.expected,
        counted = reconciliation.counted,
        difference = reconciliation.difference,
        "cash register closed"
    );
    audit::record(
        &state.pool,
        Some(user.user_id),
        "cash_close",
        "cash_registers",
        json!({ "register_id": register.id, "difference": reconciliation.difference }),
    )
    .await;

    Ok(ApiResponse::ok(
        format!(
            "Cash register closed. Difference: {}",
            format_brl(reconciliation.difference)
        ),
        ClosedRegister {
            register: register.into(),
            reconciliation,
        },
    ))
}

pub async fn add_movement(
    state: &AppState,
    user: &AuthUser,
    payload: CashMovementRequest,
) -> AppResult<ApiResponse<CashMovement>> {
    ensure_capability(user, Capability::OperatePdv)?;
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("amount must be positive".into()));
    }

    let txn = state.orm.begin().await?;
    let register = open_register(&txn, true)
        .await?
        .ok_or_else(|| AppError::business("No open cash register"))?;
    let movement = MovementActive {
        id: Set(Uuid::new_v4()),
        cash_register_id: Set(register.id),
        movement_type: Set(payload.movement_type.as_str().to_string()),
        amount: Set(payload.amount),
        description: Set(payload.description.filter(|d| !d.trim().is_empty())),
        order_id: Set(payload.order_id),
        comanda_id: Set(payload.comanda_id),
        created_by: Set(Some(user.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "cash_movement",
        "cash_movements",
        json!({ "movement_id": movement.id, "type": movement.movement_type, "amount": movement.amount }),
    )
    .await;

    Ok(ApiResponse::ok("Movement recorded", movement.into()))
}

pub async fn register_history(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<RegisterHistory>> {
    ensure_capability(user, Capability::OperatePdv)?;
    let items = CashRegisters::find()
        .filter(RegisterCol::Status.eq(cash::REGISTER_CLOSED))
        .order_by_desc(RegisterCol::ClosedAt)
        .limit(REGISTER_HISTORY)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::ok("Cash register history", RegisterHistory { items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_are_four_digits() {
        assert_eq!(pin_from(7), "0007");
        assert_eq!(pin_from(123_456), "3456");
        assert_eq!(fresh_pin().len(), 4);
    }

    #[test]
    fn comanda_numbers_are_zero_padded() {
        assert_eq!(comanda_number(0), "000001");
        assert_eq!(comanda_number(41), "000042");
    }
}
