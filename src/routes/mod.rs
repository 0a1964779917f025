use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod admin_catalog;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod doc;
pub mod health;
pub mod kitchen;
pub mod orders;
pub mod params;
pub mod payment;
pub mod pdv;
pub mod table_menu;
pub mod ws;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(customer::router())
        .nest("/auth", auth::router())
        .nest("/carrinho", cart::router())
        .nest("/pedidos", orders::router())
        .nest("/admin", admin::router().merge(admin_catalog::router()))
        .nest("/cozinha", kitchen::router())
        .nest("/pdv", pdv::router())
        .nest("/mesa", table_menu::router())
        .nest("/pagamento", payment::router())
}
