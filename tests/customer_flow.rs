use restaurant_api::{
    dto::{admin::ConfirmPaymentRequest, loyalty::RedeemRequest, reviews::CreateReviewRequest},
    error::AppError,
    middleware::auth::Role,
    routes::params::Pagination,
    services::{
        admin_service, loyalty_service, order_service, review_service, wishlist_service,
    },
};

mod common;

// A manually confirmed payment credits points once; redeeming spends them for a coupon.
#[tokio::test]
async fn confirmed_payment_earns_points_and_redeem_spends_them() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let admin = common::create_user(&state, Role::Admin).await?;
    let product_id = common::create_product(&state, "Combo Família", 7550, 10).await?;

    common::add_to_cart(&state, &customer, product_id, 2).await?;
    let order = order_service::checkout(&state, &customer, common::pickup_checkout())
        .await?
        .data
        .unwrap()
        .order;
    assert_eq!(order.total, 15_100);

    let confirm = || ConfirmPaymentRequest {
        payment_method: Some("dinheiro".into()),
        notes: None,
    };
    let first = admin_service::confirm_payment(&state, &admin, order.id, confirm())
        .await?
        .data
        .unwrap();
    assert!(first.applied);
    let second = admin_service::confirm_payment(&state, &admin, order.id, confirm())
        .await?
        .data
        .unwrap();
    assert!(!second.applied);

    let summary = loyalty_service::summary(&state, &customer).await?.data.unwrap();
    assert_eq!(summary.account.points, 151);
    assert_eq!(summary.account.total_earned, 151);
    assert_eq!(summary.transactions.len(), 1);
    let affordable: Vec<i32> = summary.available_rewards.iter().map(|t| t.points).collect();
    assert_eq!(affordable, vec![100]);

    let too_much = loyalty_service::redeem(&state, &customer, RedeemRequest { points: 250 }).await;
    assert!(matches!(too_much, Err(AppError::BusinessRule(_))));

    let odd = loyalty_service::redeem(&state, &customer, RedeemRequest { points: 120 }).await;
    assert!(matches!(odd, Err(AppError::BadRequest(_))));

    let redeemed = loyalty_service::redeem(&state, &customer, RedeemRequest { points: 100 })
        .await?
        .data
        .unwrap();
    assert_eq!(redeemed.account.points, 51);
    assert_eq!(redeemed.account.total_spent, 100);
    assert_eq!(redeemed.coupon.discount_value, 1_000);
    assert!(redeemed.coupon.code.starts_with("FIDELIDADE-"));

    let after = loyalty_service::summary(&state, &customer).await?.data.unwrap();
    assert_eq!(after.account.points, 51);
    assert_eq!(after.transactions.len(), 2);

    Ok(())
}

#[tokio::test]
async fn reviews_mark_verified_purchases_and_stay_unique() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let buyer = common::create_user(&state, Role::Customer).await?;
    let browser = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Torta de Limão", 1500, 10).await?;

    common::add_to_cart(&state, &buyer, product_id, 1).await?;
    order_service::checkout(&state, &buyer, common::pickup_checkout()).await?;

    let review = |rating| CreateReviewRequest {
        rating,
        comment: Some("Muito boa".into()),
    };

    let verified = review_service::create_review(&state, &buyer, product_id, review(5))
        .await?
        .data
        .unwrap();
    assert!(verified.verified_purchase);

    let duplicate = review_service::create_review(&state, &buyer, product_id, review(4)).await;
    assert!(matches!(duplicate, Err(AppError::BusinessRule(_))));

    let out_of_range = review_service::create_review(&state, &browser, product_id, review(6)).await;
    assert!(matches!(out_of_range, Err(AppError::BadRequest(_))));

    let unverified = review_service::create_review(&state, &browser, product_id, review(3))
        .await?
        .data
        .unwrap();
    assert!(!unverified.verified_purchase);

    let listing = review_service::list_for_product(&state, product_id)
        .await?
        .data
        .unwrap();
    assert_eq!(listing.count, 2);
    assert_eq!(listing.average, Some(4.0));

    assert!(matches!(
        review_service::delete_review(&state, &browser, verified.id).await,
        Err(AppError::Forbidden)
    ));
    review_service::delete_review(&state, &buyer, verified.id).await?;

    Ok(())
}

#[tokio::test]
async fn wishlist_add_is_idempotent() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let customer = common::create_user(&state, Role::Customer).await?;
    let product_id = common::create_product(&state, "Açaí 500ml", 1900, 10).await?;

    wishlist_service::add_to_wishlist(&state, &customer, product_id).await?;
    let again = wishlist_service::add_to_wishlist(&state, &customer, product_id).await?;
    assert_eq!(again.message, "Product already in wishlist");

    let list = wishlist_service::list_wishlist(&state, &customer, Pagination::new(None, None))
        .await?
        .data
        .unwrap();
    assert_eq!(list.items.len(), 1);
    assert_eq!(list.items[0].id, product_id);

    wishlist_service::remove_from_wishlist(&state, &customer, product_id).await?;
    let check = wishlist_service::check_wishlist(&state, &customer, product_id)
        .await?
        .data
        .unwrap();
    assert!(!check.in_wishlist);

    assert!(matches!(
        wishlist_service::remove_from_wishlist(&state, &customer, product_id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
