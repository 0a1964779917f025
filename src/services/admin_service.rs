use chrono::Utc;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::status::{self, OrderStatus, PaymentStatus, Repeat, Review, ReviewOutcome},
    dto::{
        admin::{
            ActionOutcome, AddNoteRequest, ConfirmPaymentRequest, EstimatedTimeRequest,
            InventoryAdjustRequest, LowStockList, LowStockQuery, OrderStatistics,
            RejectOrderRequest, StatusCount, UpdateOrderStatusRequest,
        },
        orders::OrderList,
        settings::UpdateSettingsRequest,
    },
    entity::{
        order_notes::ActiveModel as NoteActive,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderDetail, OrderNote, Product},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{detail, lifecycle, payment_service},
    settings::StoreSettings,
    state::AppState,
};

const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order_admin(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = detail::order_detail(&state.orm, order, true).await?;
    Ok(ApiResponse::ok("Order", detail))
}

fn outcome(applied: bool, message: impl Into<String>, order: OrderModel) -> ActionOutcome {
    ActionOutcome {
        applied,
        message: message.into(),
        order: order.into(),
    }
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<ActionOutcome>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = order.status.clone();
    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    let notes = payload.notes.filter(|n| !n.trim().is_empty());
    let result =
        lifecycle::transition_order(&txn, order, payload.status, Repeat::Ignore, &actor, notes)
            .await?;
    txn.commit().await?;

    if !result.changed {
        return Ok(ApiResponse::ok(
            "Status unchanged",
            outcome(false, "Status unchanged", result.model),
        ));
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": id, "from": previous, "to": result.model.status }),
    )
    .await;
    lifecycle::publish_order_update(state, &result.model);

    let message = format!("Status changed from \"{}\" to \"{}\"", previous, payload.status);
    Ok(ApiResponse::ok(
        message.clone(),
        outcome(true, message, result.model),
    ))
}

async fn review_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    action: Review,
    notes: String,
) -> AppResult<ApiResponse<ActionOutcome>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let to = match status::review_pending(&order.status, action) {
        ReviewOutcome::AlreadyProcessed => {
            return Ok(ApiResponse::ok(
                "Order already processed",
                outcome(false, "Order already processed", order),
            ));
        }
        ReviewOutcome::Apply(transition) => transition
            .to
            .parse::<OrderStatus>()
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?,
    };

    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    let result =
        lifecycle::transition_order(&txn, order, to, Repeat::Ignore, &actor, Some(notes)).await?;
    txn.commit().await?;

    let (action_name, message) = match action {
        Review::Accept => ("order_accept", "Order accepted"),
        Review::Reject => ("order_reject", "Order rejected"),
    };
    audit::record(
        &state.pool,
        Some(user.user_id),
        action_name,
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;
    lifecycle::publish_order_update(state, &result.model);

    Ok(ApiResponse::ok(message, outcome(true, message, result.model)))
}

pub async fn accept_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ActionOutcome>> {
    review_order(
        state,
        user,
        id,
        Review::Accept,
        "Pedido aceito automaticamente".to_string(),
    )
    .await
}

pub async fn reject_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RejectOrderRequest,
) -> AppResult<ApiResponse<ActionOutcome>> {
    let reason = payload
        .reason
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| "Pedido rejeitado pelo administrador".to_string());
    review_order(state, user, id, Review::Reject, reason).await
}

pub async fn update_estimated_time(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: EstimatedTimeRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    for minutes in [payload.estimated_prep_time, payload.estimated_delivery_time]
        .into_iter()
        .flatten()
    {
        if minutes <= 0 {
            return Err(AppError::BadRequest("estimated time must be positive".into()));
        }
    }

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let mut active: OrderActive = order.into();
    if let Some(prep) = payload.estimated_prep_time {
        active.estimated_prep_time = Set(prep);
    }
    if let Some(delivery) = payload.estimated_delivery_time {
        active.estimated_delivery_time = Set(delivery);
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    lifecycle::publish_order_update(state, &order);
    Ok(ApiResponse::ok("Estimated time updated", order.into()))
}

pub async fn add_note(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: AddNoteRequest,
) -> AppResult<ApiResponse<OrderNote>> {
    ensure_admin(user)?;
    let text = payload.note.trim().to_string();
    if text.is_empty() {
        return Err(AppError::BadRequest("note must not be empty".into()));
    }
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let note = NoteActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        note: Set(text),
        created_by: Set(Some(lifecycle::actor_name(&state.orm, user.user_id).await?)),
        is_internal: Set(payload.is_internal),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::ok("Note added", note.into()))
}

/// Manual confirmation for payments taken outside the gateway (cash, card machine, pix).
pub async fn confirm_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ConfirmPaymentRequest,
) -> AppResult<ApiResponse<ActionOutcome>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    if order.payment_status == PaymentStatus::Approved.as_str() {
        return Ok(ApiResponse::ok(
            "Payment already confirmed",
            outcome(false, "Payment already confirmed", order),
        ));
    }

    let notes = payload.notes.filter(|n| !n.trim().is_empty());
    let mut active: OrderActive = order.into();
    if let Some(method) = payload.payment_method.filter(|m| !m.trim().is_empty()) {
        active.payment_method = Set(Some(method));
    }
    active.payment_confirmed_by = Set(Some(user.user_id));
    active.payment_confirmed_at = Set(Some(Utc::now().into()));
    active.payment_confirmation_notes = Set(notes.clone());
    let order = active.update(&txn).await?;

    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    let notes = Some(notes.unwrap_or_else(|| "Pagamento confirmado manualmente".to_string()));
    let result =
        payment_service::apply_payment(&txn, order, PaymentStatus::Approved, &actor, notes).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "payment_confirm",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;
    lifecycle::publish_order_update(state, &result.model);

    Ok(ApiResponse::ok(
        "Payment confirmed",
        outcome(true, "Payment confirmed", result.model),
    ))
}

pub async fn order_statistics(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderStatistics>> {
    ensure_admin(user)?;

    let by_status: Vec<(String, i64)> = Orders::find()
        .select_only()
        .column(OrderCol::Status)
        .column_as(OrderCol::Id.count(), "count")
        .group_by(OrderCol::Status)
        .order_by_asc(OrderCol::Status)
        .into_tuple()
        .all(&state.orm)
        .await?;
    let total_orders = by_status.iter().map(|(_, count)| count).sum();

    let revenue_statuses: Vec<&str> = OrderStatus::REVENUE.iter().map(|s| s.as_str()).collect();
    let (revenue, paid_orders): (i64, i64) = Orders::find()
        .select_only()
        .column_as(Expr::cust("COALESCE(SUM(total), 0)::BIGINT"), "revenue")
        .column_as(OrderCol::Id.count(), "orders")
        .filter(OrderCol::Status.is_in(revenue_statuses))
        .into_tuple()
        .one(&state.orm)
        .await?
        .unwrap_or((0, 0));

    let stats = OrderStatistics {
        total_orders,
        by_status: by_status
            .into_iter()
            .map(|(status, count)| StatusCount { status, count })
            .collect(),
        revenue,
        average_ticket: if paid_orders > 0 { revenue / paid_orders } else { 0 },
    };
    Ok(ApiResponse::ok("Statistics", stats))
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<LowStockList>> {
    ensure_admin(user)?;
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let (page, limit, offset) = query.pagination().normalize();

    let finder = Products::find()
        .filter(ProdCol::Stock.lt(threshold))
        .filter(ProdCol::Active.eq(true))
        .order_by_asc(ProdCol::Stock)
        .order_by_asc(ProdCol::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Low stock", LowStockList { items }, Some(meta)))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be 0".into()));
    }

    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let new_stock = product
        .stock
        .checked_add(payload.delta)
        .ok_or_else(|| AppError::BadRequest("stock adjustment out of range".into()))?;
    if new_stock < 0 {
        return Err(AppError::business("stock cannot be negative"));
    }

    let mut active: ProductActive = product.into();
    active.stock = Set(new_stock);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "inventory_adjust",
        "products",
        serde_json::json!({ "product_id": updated.id, "delta": payload.delta }),
    )
    .await;

    Ok(ApiResponse::ok("Inventory updated", updated.into()))
}

pub async fn get_settings(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<StoreSettings>> {
    ensure_admin(user)?;
    Ok(ApiResponse::ok(
        "Settings",
        state.settings.store_settings().await?,
    ))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<StoreSettings>> {
    ensure_admin(user)?;
    let settings = state.settings.update(payload).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "settings_update",
        "store_settings",
        serde_json::json!({ "store_name": settings.store_name }),
    )
    .await;

    Ok(ApiResponse::ok("Settings updated", settings))
}
