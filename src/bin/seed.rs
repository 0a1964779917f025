use restaurant_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    middleware::auth::Role,
    services::auth_service::hash_password,
    settings,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,restaurant_api=debug".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&create_orm_conn(pool.clone())).await?;

    let staff = [
        ("Administrador", "admin@example.com", "11900000001", "admin123", Role::Admin),
        ("Gerente", "gerente@example.com", "11900000002", "gerente123", Role::Manager),
        ("Garçom", "garcom@example.com", "11900000003", "garcom123", Role::Waiter),
        ("Cozinha", "cozinha@example.com", "11900000004", "cozinha123", Role::Kitchen),
        ("Cliente", "cliente@example.com", "11900000005", "cliente123", Role::Customer),
    ];
    for (name, email, phone, password, role) in staff {
        let id = ensure_user(&pool, name, email, phone, password, role).await?;
        tracing::info!(%id, email, role = %role, "ensured user");
    }

    seed_catalog(&pool).await?;
    seed_extras(&pool).await?;
    seed_tables(&pool).await?;
    seed_coupons(&pool).await?;
    seed_settings(&pool).await?;

    tracing::info!("seed completed");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    phone: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, phone, password_hash, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (phone) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn category_id(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO categories (id, name)
        VALUES ($1, $2)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (category, code, name, description, price in cents, stock, featured)
    let products = [
        ("Lanches", "X001", "X-Burger", "Pão, hambúrguer e queijo", 2890, 40, true),
        ("Lanches", "X002", "X-Salada", "Pão, hambúrguer, queijo e salada", 3190, 40, false),
        ("Lanches", "X003", "X-Bacon", "Pão, hambúrguer, queijo e bacon", 3490, 30, true),
        ("Porções", "P001", "Batata Frita", "Porção de 400g", 2400, 25, false),
        ("Porções", "P002", "Calabresa Acebolada", "Porção de 500g", 3600, 15, false),
        ("Bebidas", "B001", "Refrigerante Lata", "350ml", 650, 120, false),
        ("Bebidas", "B002", "Suco Natural", "500ml", 1100, 60, false),
        ("Sobremesas", "S001", "Pudim", "Fatia", 1200, 8, false),
    ];

    for (category, code, name, description, price, stock, featured) in products {
        let category_id = category_id(pool, category).await?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, code, description, price, stock, category_id, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(code)
        .bind(description)
        .bind(price as i64)
        .bind(stock)
        .bind(category_id)
        .bind(featured)
        .execute(pool)
        .await?;
    }

    tracing::info!(count = products.len(), "seeded products");
    Ok(())
}

async fn seed_extras(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let extras = [
        ("Bacon extra", 500_i64),
        ("Queijo extra", 400),
        ("Ovo", 300),
        ("Molho da casa", 200),
    ];
    for (name, price) in extras {
        sqlx::query(
            r#"
            INSERT INTO extras (id, name, price)
            SELECT $1, $2, $3
            WHERE NOT EXISTS (SELECT 1 FROM extras WHERE name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(price)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_tables(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for number in 1..=10 {
        sqlx::query(
            r#"
            INSERT INTO dining_tables (id, table_number, capacity)
            VALUES ($1, $2, $3)
            ON CONFLICT (table_number) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(number.to_string())
        .bind(if number > 8 { 6 } else { 4 })
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_coupons(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // (code, type, value, min purchase)
    let coupons = [
        ("BEMVINDO10", "percentage", 10_i64, 0_i64),
        ("FRETE5", "fixed", 500, 3000),
    ];
    for (code, kind, value, min_purchase) in coupons {
        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_type, discount_value, min_purchase)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(kind)
        .bind(value)
        .bind(min_purchase)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let entries = [
        (settings::STORE_NAME, "Restaurante Exemplo"),
        (settings::DELIVERY_ENABLED, "true"),
        (settings::PICKUP_ENABLED, "true"),
        (settings::PICKUP_ADDRESS, "Rua das Flores, 100"),
        (settings::SHIPPING_COST, "500"),
        (settings::FREE_SHIPPING_MIN, "8000"),
    ];
    for (key, value) in entries {
        sqlx::query(
            r#"
            INSERT INTO store_settings (id, setting_key, setting_value)
            VALUES ($1, $2, $3)
            ON CONFLICT (setting_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
    }
    Ok(())
}
