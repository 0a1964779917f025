use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        pricing::{self, DeliveryType, PricedLine},
        status::{OrderStatus, PaymentStatus},
    },
    dto::orders::{CheckoutRequest, OrderList, OrderStatusView},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        coupons::{Column as CouponCol, Entity as Coupons},
        order_item_extras::ActiveModel as OrderItemExtraActive,
        order_items::ActiveModel as OrderItemActive,
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderDetail},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        cart_service::{self, CartRow},
        coupon_service, detail,
        lifecycle::{self, SUBJECT_ORDER},
    },
    state::AppState,
};

fn required(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderDetail>> {
    let txn = state.orm.begin().await?;

    let rows = cart_service::load_cart(&txn, user.user_id, true).await?;
    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let customer_name = required(&payload.customer_name, "customer_name")?;
    let customer_phone = required(&payload.customer_phone, "customer_phone")?;
    let delivery_address = match payload.delivery_type {
        DeliveryType::Delivery => Some(required(
            payload.delivery_address.as_deref().unwrap_or_default(),
            "delivery_address",
        )?),
        DeliveryType::Pickup => None,
    };

    let settings = state.settings.store_settings().await?;
    if !settings.allows(payload.delivery_type) {
        return Err(AppError::business(format!(
            "{} is not available at the moment",
            payload.delivery_type
        )));
    }

    // Lines for the same product draw on one stock counter.
    let mut demand: HashMap<Uuid, i64> = HashMap::new();
    for row in &rows {
        *demand.entry(row.product.id).or_default() += i64::from(row.item.quantity);
    }
    for row in &rows {
        let wanted = demand.get(&row.product.id).copied().unwrap_or_default();
        if !row.product.active || !cart_service::within_stock(row.product.stock, wanted, 0) {
            return Err(AppError::business(format!(
                "Insufficient stock for {}",
                row.product.name
            )));
        }
    }

    let lines: Vec<PricedLine> = rows.iter().map(CartRow::priced_line).collect();
    let subtotal = pricing::subtotal(&lines);

    let coupon = match payload
        .coupon_code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    {
        Some(code) => {
            let model = coupon_service::find_by_code(&txn, code, true)
                .await?
                .ok_or_else(|| AppError::business("Coupon not found"))?;
            let rules = coupon_service::rules_for(&model);
            rules
                .check_for_subtotal(Utc::now(), subtotal)
                .map_err(|rejection| AppError::business(rejection.to_string()))?;
            Some((model, rules))
        }
        None => None,
    };

    let quote = pricing::quote(
        &lines,
        coupon.as_ref().map(|(_, rules)| rules),
        payload.delivery_type,
        &settings.shipping_policy(),
    );

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        order_code: Set(build_order_code(order_id)),
        subtotal: Set(quote.subtotal),
        discount_amount: Set(quote.discount),
        shipping_cost: Set(quote.shipping),
        total: Set(quote.total),
        coupon_code: Set(coupon.as_ref().map(|(model, _)| model.code.clone())),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_status: Set(PaymentStatus::Pending.as_str().to_string()),
        payment_id: Set(None),
        payment_method: Set(payload.payment_method.filter(|m| !m.trim().is_empty())),
        payment_confirmed_by: Set(None),
        payment_confirmed_at: Set(None),
        payment_confirmation_notes: Set(None),
        delivery_type: Set(payload.delivery_type.as_str().to_string()),
        delivery_address: Set(delivery_address),
        customer_name: Set(Some(customer_name)),
        customer_phone: Set(Some(customer_phone)),
        observations: Set(payload.observations.filter(|o| !o.trim().is_empty())),
        estimated_prep_time: NotSet,
        estimated_delivery_time: NotSet,
        accepted_at: Set(None),
        received_at: Set(None),
        preparing_at: Set(None),
        ready_at: Set(None),
        delivered_at: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    for row in &rows {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(row.product.id),
            quantity: Set(row.item.quantity),
            price: Set(row.product.price),
            observations: Set(row.item.observations.clone()),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            received_at: Set(None),
            preparing_at: Set(None),
            ready_at: Set(None),
            delivered_at: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for (extra, quantity) in &row.extras {
            OrderItemExtraActive {
                id: Set(Uuid::new_v4()),
                order_item_id: Set(item.id),
                extra_id: Set(extra.id),
                quantity: Set(*quantity),
                price: Set(extra.price),
            }
            .insert(&txn)
            .await?;
        }
    }

    // The stock guard in the filter keeps the counter from going negative.
    for (product_id, quantity) in &demand {
        let result = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(*quantity))
            .filter(ProdCol::Id.eq(*product_id))
            .filter(ProdCol::Stock.gte(*quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::business("Insufficient stock"));
        }
    }

    if let Some((model, _)) = &coupon {
        Coupons::update_many()
            .col_expr(CouponCol::TimesUsed, Expr::col(CouponCol::TimesUsed).add(1))
            .filter(CouponCol::Id.eq(model.id))
            .exec(&txn)
            .await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    let actor = lifecycle::actor_name(&txn, user.user_id).await?;
    lifecycle::append_history(
        &txn,
        SUBJECT_ORDER,
        order.id,
        None,
        OrderStatus::Pending.as_str(),
        &actor,
        Some("Pedido criado".to_string()),
    )
    .await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": order.total }),
    )
    .await;

    lifecycle::publish_new_order(state, &order);

    let detail = detail::order_detail(&state.orm, order, false).await?;
    Ok(ApiResponse::ok("Checkout success", detail))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
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
    Ok(ApiResponse::success("Ok", OrderList { items }, Some(meta)))
}

async fn owned_order(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = owned_order(state, user, id).await?;
    let detail = detail::order_detail(&state.orm, order, false).await?;
    Ok(ApiResponse::ok("OK", detail))
}

pub async fn order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderStatusView>> {
    let order = owned_order(state, user, id).await?;
    Ok(ApiResponse::ok("OK", Order::from(order).into()))
}

/// `PED-20240131-1A2B3C4D`: creation date plus the head of the order id.
fn build_order_code(order_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = order_id.simple().to_string().to_uppercase();
    format!("PED-{}-{}", date, &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_code_has_date_and_id_prefix() {
        let id = Uuid::parse_str("1a2b3c4d-0000-4000-8000-000000000000").unwrap();
        let code = build_order_code(id);
        assert!(code.starts_with("PED-"));
        assert!(code.ends_with("-1A2B3C4D"));
        assert_eq!(code.len(), "PED-20240131-1A2B3C4D".len());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        assert!(matches!(
            required("   ", "customer_name"),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(required(" Ana ", "customer_name").unwrap(), "Ana");
    }
}
