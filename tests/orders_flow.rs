use std::{sync::Arc, time::Duration};

use chrono::Utc;
use restaurant_api::{
    domain::{coupon::DiscountKind, pricing::DeliveryType, status::OrderStatus},
    dto::{
        admin::{InventoryAdjustRequest, LowStockQuery, RejectOrderRequest, UpdateOrderStatusRequest},
        cart::{CartQuery, UpdateCartItemRequest},
        catalog::UpdateProductRequest,
        coupons::{CreateCouponRequest, UpdateCouponRequest},
        kitchen::KitchenOrderStatusRequest,
        payment::PaymentWebhook,
        settings::UpdateSettingsRequest,
    },
    error::AppError,
    middleware::auth::{AuthUser, Role},
    notify::{Event, Room},
    routes::params::OrderListQuery,
    services::{
        admin_service, cart_service, catalog_service, coupon_service, kitchen_service,
        order_service, payment_service,
    },
    settings::{MemorySettingsStore, SettingsService},
    state::AppState,
};
use uuid::Uuid;

mod common;

// Customer adds to cart and checks out for pickup; admin accepts, then sees low stock.
#[tokio::test]
async fn checkout_accept_and_low_stock_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let admin = common::create_user(&state, Role::Admin).await?;
    let product_id = common::create_product(&state, "X-Burger", 2890, 10).await?;

    common::add_to_cart(&state, &customer, product_id, 2).await?;
    let detail = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap();
    let order = detail.order;
    assert_eq!(order.subtotal, 5780);
    assert_eq!(order.shipping_cost, 0);
    assert_eq!(order.total, 5780);
    assert_eq!(order.status, "Pendente");
    assert_eq!(order.payment_status, "Pendente");
    assert!(order.order_code.starts_with("PED-"));
    assert_eq!(detail.history.len(), 1);
    assert_eq!(detail.history[0].old_status, None);

    let accepted = admin_service::accept_order(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert!(accepted.applied);
    assert_eq!(accepted.order.status, "Confirmado");
    assert!(accepted.order.accepted_at.is_some());

    let again = admin_service::accept_order(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert!(!again.applied);
    assert_eq!(again.message, "Order already processed");

    let view = admin_service::get_order_admin(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    let statuses: Vec<&str> = view.history.iter().map(|h| h.new_status.as_str()).collect();
    assert_eq!(statuses, vec!["Pendente", "Confirmado"]);

    // Stock went from 10 to 8, below the default threshold.
    let low = admin_service::list_low_stock(
        &state,
        &admin,
        LowStockQuery {
            page: Some(1),
            per_page: Some(100),
            threshold: None,
        },
    )
    .await?
    .data
    .unwrap();
    let entry = low.items.iter().find(|p| p.id == product_id);
    assert_eq!(entry.map(|p| p.stock), Some(8));

    // Customers cannot reach the back-office.
    assert!(matches!(
        admin_service::accept_order(&state, &customer, order.id).await,
        Err(AppError::Forbidden)
    ));

    Ok(())
}

#[tokio::test]
async fn checkout_with_insufficient_stock_creates_nothing() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let admin = common::create_user(&state, Role::Admin).await?;
    let product_id = common::create_product(&state, "Pudim", 1200, 1).await?;

    common::add_to_cart(&state, &customer, product_id, 1).await?;
    admin_service::adjust_inventory(&state, &admin, product_id, InventoryAdjustRequest { delta: -1 })
        .await?;

    let result = order_service::checkout(&state, &customer, common::pickup_checkout()).await;
    assert!(matches!(result, Err(AppError::BusinessRule(_))));

    let orders = order_service::list_orders(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(orders.items.is_empty());

    let below_zero = admin_service::adjust_inventory(
        &state,
        &admin,
        product_id,
        InventoryAdjustRequest { delta: -1 },
    )
    .await;
    assert!(matches!(below_zero, Err(AppError::BusinessRule(_))));

    Ok(())
}

#[tokio::test]
async fn approved_webhook_confirms_order_once() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Batata Frita", 2400, 5).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;

    let webhook = || PaymentWebhook {
        external_reference: order.id.to_string(),
        status: "approved".into(),
        payment_id: Some("pay-123".into()),
    };
    let ack = payment_service::handle_webhook(&state, webhook()).await?.data.unwrap();
    assert!(ack.processed);
    payment_service::handle_webhook(&state, webhook()).await?;

    let view = order_service::order_status(&state, &customer, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(view.payment_status, "Aprovado");
    assert_eq!(view.status, "Confirmado");

    let detail = order_service::get_order(&state, &customer, order.id)
        .await?
        .data
        .unwrap();
    let confirmations = detail
        .history
        .iter()
        .filter(|h| h.new_status == "Confirmado")
        .count();
    assert_eq!(confirmations, 1);
    assert!(detail.history.iter().any(|h| h.changed_by.as_deref() == Some("gateway")));

    let unknown = payment_service::handle_webhook(
        &state,
        PaymentWebhook {
            external_reference: "not-an-order".into(),
            status: "approved".into(),
            payment_id: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!unknown.processed);

    Ok(())
}

fn unique_code(prefix: &str) -> String {
    format!("{prefix}{}", &Uuid::new_v4().simple().to_string()[..8]).to_uppercase()
}

async fn create_coupon(
    state: &AppState,
    admin: &AuthUser,
    kind: DiscountKind,
    value: i64,
    min_purchase: i64,
) -> anyhow::Result<String> {
    let coupon = coupon_service::create_coupon(
        state,
        admin,
        CreateCouponRequest {
            code: unique_code("DESC"),
            discount_type: kind,
            discount_value: value,
            min_purchase,
            max_uses: None,
            valid_from: None,
            valid_until: None,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(coupon.code)
}

async fn times_used(state: &AppState, code: &str) -> anyhow::Result<i32> {
    let coupon = coupon_service::find_by_code(&state.orm, code, false).await?;
    Ok(coupon.map(|c| c.times_used).unwrap_or_default())
}

#[tokio::test]
async fn coupon_discounts_checkout_and_counts_its_use() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let product_id = common::create_product(&state, "X-Salada", 2890, 10).await?;
    let fixed = create_coupon(&state, &admin, DiscountKind::Fixed, 1_000, 0).await?;
    let percent = create_coupon(&state, &admin, DiscountKind::Percentage, 10, 0).await?;

    let first = common::create_user(&state, Role::Customer).await?;
    common::add_to_cart(&state, &first, product_id, 2).await?;
    let mut request = common::pickup_checkout();
    request.coupon_code = Some(fixed.to_lowercase());
    let order = order_service::checkout(&state, &first, request)
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.subtotal, 5_780);
    assert_eq!(order.discount_amount, 1_000);
    assert_eq!(order.total, 4_780);
    assert_eq!(order.coupon_code.as_deref(), Some(fixed.as_str()));
    assert_eq!(times_used(&state, &fixed).await?, 1);

    let second = common::create_user(&state, Role::Customer).await?;
    common::add_to_cart(&state, &second, product_id, 2).await?;
    let mut request = common::pickup_checkout();
    request.coupon_code = Some(percent.clone());
    let order = order_service::checkout(&state, &second, request)
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.discount_amount, 578);
    assert_eq!(order.total, 5_202);
    assert_eq!(times_used(&state, &percent).await?, 1);
    assert_eq!(times_used(&state, &fixed).await?, 1);

    Ok(())
}

// A coupon previewed on the cart is checked again when the order is placed.
#[tokio::test]
async fn coupon_valid_at_preview_can_fail_at_checkout() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Pastel de Queijo", 2890, 10).await?;
    let minimum = create_coupon(&state, &admin, DiscountKind::Fixed, 500, 5_000).await?;
    let expiring = create_coupon(&state, &admin, DiscountKind::Fixed, 500, 0).await?;

    let line = cart_service::add_to_cart(
        &state,
        &customer,
        restaurant_api::dto::cart::AddToCartRequest {
            product_id,
            quantity: 2,
            observations: None,
            extras: Vec::new(),
        },
    )
    .await?
    .data
    .unwrap();

    let preview = |code: &str| CartQuery {
        coupon: Some(code.to_string()),
        delivery_type: Some(DeliveryType::Pickup),
    };
    let cart = cart_service::view_cart(&state, &customer, preview(&minimum))
        .await?
        .data
        .unwrap();
    assert_eq!(cart.coupon_code.as_deref(), Some(minimum.as_str()));
    assert_eq!(cart.coupon_error, None);
    assert_eq!(cart.quote.discount, 500);

    // Dropping to one unit leaves the subtotal under the coupon minimum.
    cart_service::update_quantity(&state, &customer, line.id, UpdateCartItemRequest { quantity: 1 })
        .await?;
    let mut request = common::pickup_checkout();
    request.coupon_code = Some(minimum.clone());
    let below = order_service::checkout(&state, &customer, request).await;
    assert!(matches!(below, Err(AppError::BusinessRule(_))));

    let cart = cart_service::view_cart(&state, &customer, preview(&expiring))
        .await?
        .data
        .unwrap();
    assert_eq!(cart.coupon_error, None);

    let coupon = coupon_service::find_by_code(&state.orm, &expiring, false)
        .await?
        .unwrap();
    coupon_service::update_coupon(
        &state,
        &admin,
        coupon.id,
        UpdateCouponRequest {
            valid_until: Some(Utc::now() - chrono::Duration::minutes(1)),
            ..Default::default()
        },
    )
    .await?;
    let mut request = common::pickup_checkout();
    request.coupon_code = Some(expiring.clone());
    let expired = order_service::checkout(&state, &customer, request).await;
    assert!(matches!(expired, Err(AppError::BusinessRule(_))));

    let orders = order_service::list_orders(&state, &customer, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(orders.items.is_empty());
    assert_eq!(times_used(&state, &minimum).await?, 0);
    assert_eq!(times_used(&state, &expiring).await?, 0);

    let cart = cart_service::view_cart(&state, &customer, CartQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn delivery_checkout_requires_address_and_charges_the_fee() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };
    let state = AppState {
        settings: SettingsService::new(Arc::new(MemorySettingsStore::new())),
        ..state
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    admin_service::update_settings(
        &state,
        &admin,
        UpdateSettingsRequest {
            delivery_enabled: Some(true),
            shipping_cost: Some(1_500),
            free_shipping_min: Some(30_000),
            ..Default::default()
        },
    )
    .await?;

    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "X-Bacon", 2890, 10).await?;
    common::add_to_cart(&state, &customer, product_id, 2).await?;

    let mut request = common::pickup_checkout();
    request.delivery_type = DeliveryType::Delivery;
    request.delivery_address = Some("   ".into());
    let missing = order_service::checkout(&state, &customer, request).await;
    assert!(matches!(missing, Err(AppError::BadRequest(_))));

    let mut request = common::pickup_checkout();
    request.delivery_type = DeliveryType::Delivery;
    request.delivery_address = Some("Rua das Flores, 123".into());
    let order = order_service::checkout(&state, &customer, request)
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.subtotal, 5_780);
    assert_eq!(order.shipping_cost, 1_500);
    assert_eq!(order.total, 7_280);
    assert_eq!(order.delivery_type, "delivery");
    assert_eq!(order.delivery_address.as_deref(), Some("Rua das Flores, 123"));

    Ok(())
}

#[tokio::test]
async fn order_items_keep_the_price_paid() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Parmegiana", 4290, 10).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;

    catalog_service::update_product(
        &state,
        &admin,
        product_id,
        UpdateProductRequest {
            price: Some(5_990),
            ..Default::default()
        },
    )
    .await?;

    let detail = order_service::get_order(&state, &customer, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].item.price, 4_290);
    assert_eq!(detail.order.total, 4_290);

    Ok(())
}

#[tokio::test]
async fn rejecting_twice_reports_already_processed() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Lasanha", 3800, 10).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;

    let reason = || RejectOrderRequest {
        reason: Some("Fora da área de entrega".into()),
    };
    let rejected = admin_service::reject_order(&state, &admin, order.id, reason())
        .await?
        .data
        .unwrap();
    assert!(rejected.applied);
    assert_eq!(rejected.order.status, "Cancelado");

    let history_after_reject = admin_service::get_order_admin(&state, &admin, order.id)
        .await?
        .data
        .unwrap()
        .history
        .len();
    assert_eq!(history_after_reject, 2);

    let again = admin_service::reject_order(&state, &admin, order.id, reason())
        .await?
        .data
        .unwrap();
    assert!(!again.applied);
    assert_eq!(again.message, "Order already processed");
    assert_eq!(again.order.status, "Cancelado");

    let accept = admin_service::accept_order(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert!(!accept.applied);

    let view = admin_service::get_order_admin(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(view.history.len(), history_after_reject);

    Ok(())
}

// Repeating a status from the kitchen refreshes its stamp; the admin form treats it as a no-op.
#[tokio::test]
async fn kitchen_repeat_refreshes_ready_stamp() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let kitchen = common::create_user(&state, Role::Kitchen).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Feijoada", 4500, 10).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;
    admin_service::accept_order(&state, &admin, order.id).await?;

    let ready = || KitchenOrderStatusRequest {
        status: OrderStatus::Ready,
        notes: None,
    };
    let first = kitchen_service::update_order_status(&state, &kitchen, order.id, ready())
        .await?
        .data
        .unwrap();
    assert!(first.applied);
    let first_ready_at = first.order.ready_at.unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    let mut rx = state.notifier.subscribe();
    let second = kitchen_service::update_order_status(&state, &kitchen, order.id, ready())
        .await?
        .data
        .unwrap();
    assert!(second.applied);
    assert_eq!(second.order.status, "Pronto");
    assert!(second.order.ready_at.unwrap() > first_ready_at);
    assert!(rx.try_recv().is_ok());

    let same = admin_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Ready,
            notes: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!same.applied);
    assert_eq!(same.message, "Status unchanged");

    let view = admin_service::get_order_admin(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    let ready_rows = view
        .history
        .iter()
        .filter(|h| h.new_status == "Pronto")
        .count();
    assert_eq!(ready_rows, 1);

    Ok(())
}

// A redelivered approval must not pull an order back from a later kitchen status.
#[tokio::test]
async fn replayed_approval_keeps_kitchen_progress() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let kitchen = common::create_user(&state, Role::Kitchen).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Moqueca", 6200, 5).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;

    let approved = || PaymentWebhook {
        external_reference: order.id.to_string(),
        status: "approved".into(),
        payment_id: Some("pay-456".into()),
    };
    payment_service::handle_webhook(&state, approved()).await?;
    kitchen_service::update_order_status(
        &state,
        &kitchen,
        order.id,
        KitchenOrderStatusRequest {
            status: OrderStatus::Ready,
            notes: None,
        },
    )
    .await?;
    payment_service::handle_webhook(&state, approved()).await?;

    let detail = order_service::get_order(&state, &customer, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(detail.order.status, "Pronto");
    assert_eq!(detail.order.payment_status, "Aprovado");
    let confirmations = detail
        .history
        .iter()
        .filter(|h| h.new_status == "Confirmado")
        .count();
    assert_eq!(confirmations, 1);

    Ok(())
}

// Storefront orders notify admin, kitchen and their customer; no table or waiter room.
#[tokio::test]
async fn order_events_reach_kitchen_and_customer() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let admin = common::create_user(&state, Role::Admin).await?;
    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Escondidinho", 3300, 5).await?;
    common::add_to_cart(&state, &customer, product_id, 1).await?;

    let mut rx = state.notifier.subscribe();
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;
    admin_service::accept_order(&state, &admin, order.id).await?;

    let mut seen = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        seen.push((notification.room, notification.event));
    }
    assert!(seen.contains(&(Room::AdminOrders, Event::NewOrder)));
    assert!(seen.contains(&(Room::KitchenAll, Event::NewOrder)));
    assert!(seen.contains(&(Room::User(customer.user_id), Event::OrderStatusChanged)));
    assert!(
        !seen
            .iter()
            .any(|(room, _)| matches!(room, Room::Table(_) | Room::Waiter(_)))
    );

    Ok(())
}
