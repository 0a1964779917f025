use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait, sea_query::LockType,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    domain::status::{ComandaItemStatus, OrderStatus, Repeat},
    dto::{
        admin::ActionOutcome,
        kitchen::{
            ComandaItemStatusRequest, KitchenBoard, KitchenComandaItem, KitchenOrderStatusRequest,
        },
    },
    entity::{
        comanda_items::{ActiveModel as ComandaItemActive, Column as ComandaItemCol, Entity as ComandaItems},
        comandas::{Column as ComandaCol, Entity as Comandas},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Column as OrderCol, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Capability, ensure_capability},
    models::{ComandaItem, OrderItem},
    notify::OrderAudience,
    response::ApiResponse,
    services::{
        detail,
        lifecycle::{self, SUBJECT_COMANDA_ITEM},
    },
    state::AppState,
};

/// Orders in a kitchen-active status, oldest first, plus comanda items not yet started.
pub async fn board(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<KitchenBoard>> {
    ensure_capability(user, Capability::OperateKitchen)?;

    let active: Vec<&str> = OrderStatus::KITCHEN_ACTIVE
        .iter()
        .map(|s| s.as_str())
        .collect();
    let orders = Orders::find()
        .filter(OrderCol::Status.is_in(active))
        .order_by_asc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let orders = detail::order_details(&state.orm, orders, true).await?;

    let items = ComandaItems::find()
        .filter(ComandaItemCol::Status.eq(ComandaItemStatus::Pending.as_str()))
        .order_by_asc(ComandaItemCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let comanda_ids: Vec<Uuid> = items.iter().map(|i| i.comanda_id).collect();
    let comandas: HashMap<Uuid, _> = if comanda_ids.is_empty() {
        HashMap::new()
    } else {
        Comandas::find()
            .filter(ComandaCol::Id.is_in(comanda_ids))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let comanda_items = detail::comanda_item_details(&state.orm, items)
        .await?
        .into_iter()
        .filter_map(|detail| {
            let comanda = comandas.get(&detail.item.comanda_id)?;
            Some(KitchenComandaItem {
                comanda_id: comanda.id,
                comanda_number: comanda.comanda_number.clone(),
                table_id: comanda.table_id,
                detail,
            })
        })
        .collect();

    Ok(ApiResponse::ok(
        "Kitchen board",
        KitchenBoard {
            orders,
            comanda_items,
        },
    ))
}

/// The kitchen flow, plus the two storefront steps older kitchen screens still send.
fn kitchen_may_set(status: OrderStatus) -> bool {
    status.is_kitchen_step() || matches!(status, OrderStatus::Confirmed | OrderStatus::Preparing)
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: KitchenOrderStatusRequest,
) -> AppResult<ApiResponse<ActionOutcome>> {
    ensure_capability(user, Capability::OperateKitchen)?;
    if !kitchen_may_set(payload.status) {
        return Err(AppError::BadRequest(format!(
            "Invalid kitchen status {}",
            payload.status
        )));
    }

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
        lifecycle::transition_order(&txn, order, payload.status, Repeat::Restamp, &actor, notes)
            .await?;
    txn.commit().await?;

    if !result.changed {
        return Ok(ApiResponse::ok(
            "Status unchanged",
            ActionOutcome {
                applied: false,
                message: "Status unchanged".into(),
                order: result.model.into(),
            },
        ));
    }

    tracing::info!(
        order_id = %id,
        from = %previous,
        to = %payload.status,
        restamped = result.restamped,
        "kitchen moved order"
    );
    lifecycle::publish_order_update(state, &result.model);

    let message = if result.restamped {
        format!("Status \"{}\" confirmed again", payload.status)
    } else {
        format!("Status changed from \"{}\" to \"{}\"", previous, payload.status)
    };
    Ok(ApiResponse::ok(
        message.clone(),
        ActionOutcome {
            applied: true,
            message,
            order: result.model.into(),
        },
    ))
}

pub async fn update_order_item_status(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    item_id: Uuid,
    payload: KitchenOrderStatusRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_capability(user, Capability::OperateKitchen)?;
    if !payload.status.is_kitchen_step() {
        return Err(AppError::BadRequest(format!(
            "Invalid kitchen status {}",
            payload.status
        )));
    }

    let txn = state.orm.begin().await?;
    let item = OrderItems::find()
        .filter(OrderItemCol::Id.eq(item_id))
        .filter(OrderItemCol::OrderId.eq(order_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let order = Orders::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    let result =
        lifecycle::transition_order_item(&txn, item, payload.status, Repeat::Restamp, &actor)
            .await?;
    txn.commit().await?;

    if !result.changed {
        return Ok(ApiResponse::ok("Status unchanged", result.model.into()));
    }

    let audience = lifecycle::order_audience(&order);
    let mut event = lifecycle::order_payload(&order);
    event["item_id"] = json!(result.model.id);
    event["item_status"] = json!(result.model.status);
    state.notifier.order_status_changed(audience, event);

    Ok(ApiResponse::ok(
        format!("Item moved to \"{}\"", payload.status),
        result.model.into(),
    ))
}

pub async fn update_comanda_item_status(
    state: &AppState,
    user: &AuthUser,
    item_id: Uuid,
    payload: ComandaItemStatusRequest,
) -> AppResult<ApiResponse<ComandaItem>> {
    ensure_capability(user, Capability::OperateKitchen)?;

    let txn = state.orm.begin().await?;
    let item = ComandaItems::find_by_id(item_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let comanda = Comandas::find_by_id(item.comanda_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let to = payload.status.as_str();
    if item.status == to {
        return Ok(ApiResponse::ok("Status unchanged", item.into()));
    }

    let previous = item.status.clone();
    let mut active: ComandaItemActive = item.into();
    active.status = Set(to.to_string());
    if payload.status != ComandaItemStatus::Pending {
        active.sent_to_kitchen = Set(true);
    }
    let item = active.update(&txn).await?;

    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    lifecycle::append_history(
        &txn,
        SUBJECT_COMANDA_ITEM,
        item.id,
        Some(&previous),
        to,
        &actor,
        None,
    )
    .await?;
    txn.commit().await?;

    state.notifier.comanda_item_updated(
        comanda.id,
        OrderAudience {
            user_id: None,
            table_id: comanda.table_id,
            waiter_id: comanda.waiter_id,
        },
        json!({
            "item_id": item.id,
            "comanda_id": comanda.id,
            "comanda_number": comanda.comanda_number,
            "status": item.status,
        }),
    );

    Ok(ApiResponse::ok(
        format!("Item of comanda #{} moved to \"{}\"", comanda.comanda_number, to),
        item.into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitchen_accepts_its_flow_and_legacy_steps() {
        for status in OrderStatus::KITCHEN_FLOW {
            assert!(kitchen_may_set(status));
        }
        assert!(kitchen_may_set(OrderStatus::Confirmed));
        assert!(kitchen_may_set(OrderStatus::Preparing));
        assert!(!kitchen_may_set(OrderStatus::Cancelled));
        assert!(!kitchen_may_set(OrderStatus::Shipped));
        assert!(!kitchen_may_set(OrderStatus::Pending));
    }
}
