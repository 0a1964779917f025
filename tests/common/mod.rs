#![allow(dead_code)]

use restaurant_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{cart::AddToCartRequest, orders::CheckoutRequest},
    domain::pricing::DeliveryType,
    entity::{products::ActiveModel as ProductActive, users::ActiveModel as UserActive},
    middleware::auth::{AuthUser, Role},
    services::cart_service,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;

pub fn test_config(database_url: &str) -> AppConfig {
    AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        max_db_connections: 5,
        public_base_url: "http://localhost:3000".into(),
        notify_buffer: 64,
    }
}

/// State against the test database, or `None` when no database is configured.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests.");
            return Ok(None);
        }
    };

    let pool = create_pool(&database_url, 5).await?;
    let state = AppState::new(pool, &test_config(&database_url));
    run_migrations(&state.orm).await?;
    Ok(Some(state))
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_string()
}

pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let id = short_id();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(format!("{role}-{id}")),
        email: Set(Some(format!("{id}@example.com"))),
        phone: Set(id),
        password_hash: Set(None),
        role: Set(role.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        code: Set(format!("T-{}", short_id())),
        description: Set(None),
        price: Set(price),
        stock: Set(stock),
        image_url: Set(None),
        category_id: Set(None),
        featured: Set(false),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(
        state,
        user,
        AddToCartRequest {
            product_id,
            quantity,
            observations: None,
            extras: Vec::new(),
        },
    )
    .await?;
    Ok(())
}

pub fn pickup_checkout() -> CheckoutRequest {
    CheckoutRequest {
        delivery_type: DeliveryType::Pickup,
        customer_name: "Maria".into(),
        customer_phone: "11999990000".into(),
        delivery_address: None,
        observations: None,
        coupon_code: None,
        payment_method: Some("pix".into()),
    }
}
