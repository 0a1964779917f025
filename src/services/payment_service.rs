use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::status::{PaymentStatus, Repeat},
    dto::payment::{PaymentWebhook, WebhookAck},
    entity::orders::{ActiveModel as OrderActive, Entity as Orders, Model as OrderModel},
    error::AppResult,
    response::ApiResponse,
    services::{
        lifecycle::{self, Changed},
        loyalty_service,
    },
    state::AppState,
};

const GATEWAY_ACTOR: &str = "gateway";

/// Records a payment outcome and applies its effect on the order status.
/// A repeated outcome (gateways redeliver callbacks) changes nothing, so an
/// order the kitchen already moved on is left where it is. Approval also
/// credits loyalty points, once per order.
pub async fn apply_payment<C: ConnectionTrait>(
    conn: &C,
    order: OrderModel,
    payment: PaymentStatus,
    actor: &str,
    notes: Option<String>,
) -> AppResult<Changed<OrderModel>> {
    if order.payment_status == payment.as_str() {
        return Ok(Changed {
            model: order,
            changed: false,
            restamped: false,
        });
    }

    let mut active: OrderActive = order.into();
    active.payment_status = Set(payment.as_str().to_string());
    let mut order = active.update(conn).await?;

    if let Some(effect) = payment.order_effect() {
        let notes = notes.or_else(|| Some(format!("Pagamento {}", payment)));
        order = lifecycle::transition_order(conn, order, effect, Repeat::Ignore, actor, notes)
            .await?
            .model;
    }

    if payment == PaymentStatus::Approved {
        loyalty_service::earn_for_order(conn, &order).await?;
    }

    Ok(Changed {
        model: order,
        changed: true,
        restamped: false,
    })
}

/// Gateway callback. Always acknowledged; unknown orders and statuses are
/// logged and ignored.
pub async fn handle_webhook(
    state: &AppState,
    payload: PaymentWebhook,
) -> AppResult<ApiResponse<WebhookAck>> {
    let ignored = || ApiResponse::ok("Ignored", WebhookAck { processed: false });

    let Ok(order_id) = Uuid::parse_str(payload.external_reference.trim()) else {
        tracing::warn!(reference = %payload.external_reference, "webhook with invalid reference");
        return Ok(ignored());
    };
    let Some(payment) = PaymentStatus::from_gateway(payload.status.trim()) else {
        tracing::warn!(%order_id, status = %payload.status, "webhook with unknown payment status");
        return Ok(ignored());
    };

    let txn = state.orm.begin().await?;
    let Some(order) = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
    else {
        tracing::warn!(%order_id, "webhook for unknown order");
        return Ok(ignored());
    };

    let order = match payload.payment_id.filter(|id| !id.is_empty()) {
        Some(payment_id) if order.payment_id.as_deref() != Some(payment_id.as_str()) => {
            let mut active: OrderActive = order.into();
            active.payment_id = Set(Some(payment_id));
            active.update(&txn).await?
        }
        _ => order,
    };

    let outcome = apply_payment(&txn, order, payment, GATEWAY_ACTOR, None).await?;
    txn.commit().await?;

    tracing::info!(%order_id, payment = %payment, changed = outcome.changed, "payment webhook processed");
    audit::record(
        &state.pool,
        None,
        "payment_webhook",
        "orders",
        serde_json::json!({ "order_id": order_id, "status": payment.as_str() }),
    )
    .await;

    if outcome.changed {
        lifecycle::publish_order_update(state, &outcome.model);
    }

    Ok(ApiResponse::ok("Processed", WebhookAck { processed: true }))
}
