//! Persisting status transitions: the status column, its reached-at stamp and
//! the history row are written together on the caller's connection, so a
//! transaction covers all three.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, EntityTrait, Set,
    prelude::DateTimeWithTimeZone,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    domain::status::{self, OrderStatus, Repeat, Stamp, Step},
    entity::{
        order_items::{ActiveModel as OrderItemActive, Model as OrderItemModel},
        orders::{ActiveModel as OrderActive, Model as OrderModel},
        status_history::ActiveModel as HistoryActive,
        users::Entity as Users,
    },
    error::AppResult,
    notify::OrderAudience,
    state::AppState,
};

pub const SUBJECT_ORDER: &str = "order";
pub const SUBJECT_ORDER_ITEM: &str = "order_item";
pub const SUBJECT_COMANDA_ITEM: &str = "comanda_item";

pub async fn append_history<C: ConnectionTrait>(
    conn: &C,
    subject: &str,
    subject_id: Uuid,
    old_status: Option<&str>,
    new_status: &str,
    changed_by: &str,
    notes: Option<String>,
) -> AppResult<()> {
    HistoryActive {
        id: Set(Uuid::new_v4()),
        subject: Set(subject.to_string()),
        subject_id: Set(subject_id),
        old_status: Set(old_status.map(str::to_string)),
        new_status: Set(new_status.to_string()),
        changed_by: Set(Some(changed_by.to_string())),
        notes: Set(notes),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// The row after the call. `changed` is set when the status moved or, for
/// a repeated kitchen step, when its stamp was refreshed.
pub struct Changed<M> {
    pub model: M,
    pub changed: bool,
    pub restamped: bool,
}

impl<M> Changed<M> {
    fn untouched(model: M) -> Self {
        Self {
            model,
            changed: false,
            restamped: false,
        }
    }
}

fn stamp_order(active: &mut OrderActive, stamp: Option<Stamp>, now: DateTimeWithTimeZone) {
    match stamp {
        Some(Stamp::Accepted) => active.accepted_at = Set(Some(now)),
        Some(Stamp::Received) => active.received_at = Set(Some(now)),
        Some(Stamp::Preparing) => active.preparing_at = Set(Some(now)),
        Some(Stamp::Ready) => active.ready_at = Set(Some(now)),
        Some(Stamp::Delivered) => active.delivered_at = Set(Some(now)),
        None => {}
    }
}

fn stamp_order_item(active: &mut OrderItemActive, stamp: Option<Stamp>, now: DateTimeWithTimeZone) {
    match stamp {
        Some(Stamp::Received) => active.received_at = Set(Some(now)),
        Some(Stamp::Preparing) => active.preparing_at = Set(Some(now)),
        Some(Stamp::Ready) => active.ready_at = Set(Some(now)),
        Some(Stamp::Delivered) => active.delivered_at = Set(Some(now)),
        Some(Stamp::Accepted) | None => {}
    }
}

pub async fn transition_order<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
    to: OrderStatus,
    repeat: Repeat,
    actor: &str,
    notes: Option<String>,
) -> AppResult<Changed<OrderModel>> {
    let transition = match status::plan(&order.status, to.as_str(), repeat) {
        Step::Stay => return Ok(Changed::untouched(order)),
        Step::Restamp => None,
        Step::Move(transition) => Some(transition),
    };

    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: OrderActive = order.into();
    stamp_order(&mut active, to.stamp(), now);
    active.updated_at = Set(now);
    let Some(transition) = transition else {
        let order = active.update(conn).await?;
        return Ok(Changed {
            model: order,
            changed: true,
            restamped: true,
        });
    };

    active.status = Set(transition.to.clone());
    let order = active.update(conn).await?;

    append_history(
        conn,
        SUBJECT_ORDER,
        order.id,
        Some(&transition.from),
        &transition.to,
        actor,
        notes,
    )
    .await?;

    Ok(Changed {
        model: order,
        changed: true,
        restamped: false,
    })
}

pub async fn transition_order_item<C: ConnectionTrait>(
    conn: &C,
    item: OrderItemModel,
    to: OrderStatus,
    repeat: Repeat,
    actor: &str,
) -> AppResult<Changed<OrderItemModel>> {
    let transition = match status::plan(&item.status, to.as_str(), repeat) {
        Step::Stay => return Ok(Changed::untouched(item)),
        // Items carry no acceptance stamp, so there is nothing to refresh.
        Step::Restamp if matches!(to.stamp(), None | Some(Stamp::Accepted)) => {
            return Ok(Changed::untouched(item));
        }
        Step::Restamp => None,
        Step::Move(transition) => Some(transition),
    };

    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: OrderItemActive = item.into();
    stamp_order_item(&mut active, to.stamp(), now);
    let Some(transition) = transition else {
        let item = active.update(conn).await?;
        return Ok(Changed {
            model: item,
            changed: true,
            restamped: true,
        });
    };

    active.status = Set(transition.to.clone());
    let item = active.update(conn).await?;

    append_history(
        conn,
        SUBJECT_ORDER_ITEM,
        item.id,
        Some(&transition.from),
        &transition.to,
        actor,
        None,
    )
    .await?;

    Ok(Changed {
        model: item,
        changed: true,
        restamped: false,
    })
}

/// Name written to `changed_by`: the username, or the id for a deleted account.
pub async fn actor_name<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> AppResult<String> {
    Ok(Users::find_by_id(user_id)
        .one(conn)
        .await?
        .map(|user| user.username)
        .unwrap_or_else(|| user_id.to_string()))
}

/// Order events reach the kitchen and the customer who placed the order.
pub fn order_audience(order: &OrderModel) -> OrderAudience {
    OrderAudience::customer(order.user_id)
}

pub fn order_payload(order: &OrderModel) -> serde_json::Value {
    json!({
        "order_id": order.id,
        "order_code": order.order_code,
        "status": order.status,
        "payment_status": order.payment_status,
        "total": order.total,
        "estimated_prep_time": order.estimated_prep_time,
        "estimated_delivery_time": order.estimated_delivery_time,
    })
}

pub fn publish_new_order(state: &AppState, order: &OrderModel) {
    let audience = order_audience(order);
    let mut payload = order_payload(order);
    payload["customer_name"] = json!(order.customer_name);
    payload["delivery_type"] = json!(order.delivery_type);
    payload["created_at"] = json!(order.created_at.to_rfc3339());
    state.notifier.new_order(audience, payload);
}

pub fn publish_order_update(state: &AppState, order: &OrderModel) {
    let audience = order_audience(order);
    state
        .notifier
        .order_status_changed(audience, order_payload(order));
}
