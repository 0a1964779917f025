use restaurant_api::{
    dto::{
        admin::InventoryAdjustRequest,
        cart::{AddToCartRequest, CartQuery, UpdateCartItemRequest},
    },
    error::AppError,
    middleware::auth::Role,
    services::{admin_service, cart_service},
};
use uuid::Uuid;

mod common;

fn add_request(product_id: Uuid, quantity: i32) -> AddToCartRequest {
    AddToCartRequest {
        product_id,
        quantity,
        observations: None,
        extras: Vec::new(),
    }
}

// Quantities near i32::MAX are refused as a stock problem instead of wrapping.
#[tokio::test]
async fn oversized_quantities_are_refused_as_insufficient_stock() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let admin = common::create_user(&state, Role::Admin).await?;
    let product_id = common::create_product(&state, "Coxinha", 650, 5).await?;

    let line = cart_service::add_to_cart(&state, &customer, add_request(product_id, 1))
        .await?
        .data
        .unwrap();

    let huge = cart_service::add_to_cart(&state, &customer, add_request(product_id, i32::MAX)).await;
    assert!(matches!(huge, Err(AppError::BusinessRule(_))));

    let second = cart_service::add_to_cart(&state, &customer, add_request(product_id, 2))
        .await?
        .data
        .unwrap();

    let resized = cart_service::update_quantity(
        &state,
        &customer,
        line.id,
        UpdateCartItemRequest { quantity: i32::MAX },
    )
    .await;
    assert!(matches!(resized, Err(AppError::BusinessRule(_))));

    // The other line holds 2 of 5, so 3 still fit.
    let fits = cart_service::update_quantity(
        &state,
        &customer,
        line.id,
        UpdateCartItemRequest { quantity: 3 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(fits.quantity, 3);

    let cart = cart_service::view_cart(&state, &customer, CartQuery::default())
        .await?
        .data
        .unwrap();
    let held: i32 = cart.items.iter().map(|l| l.quantity).sum();
    assert_eq!(held, 5);
    assert!(cart.items.iter().any(|l| l.id == second.id));

    let overflow = admin_service::adjust_inventory(
        &state,
        &admin,
        product_id,
        InventoryAdjustRequest { delta: i32::MAX },
    )
    .await;
    assert!(matches!(overflow, Err(AppError::BadRequest(_))));

    let restocked = admin_service::adjust_inventory(
        &state,
        &admin,
        product_id,
        InventoryAdjustRequest { delta: 10 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(restocked.stock, 15);

    Ok(())
}
