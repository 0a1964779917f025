use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin as admin_dto, auth as auth_dto, cart as cart_dto, catalog as catalog_dto,
        coupons as coupon_dto, kitchen as kitchen_dto, loyalty as loyalty_dto,
        orders as order_dto, payment as payment_dto, pdv as pdv_dto, reviews as review_dto,
        settings as settings_dto, table_menu as table_dto, wishlist as wishlist_dto,
    },
    models::{
        CartLine, CartView, CashMovement, CashRegister, Category, Comanda, ComandaDetail,
        ComandaItem, Coupon, DiningTable, Extra, LoyaltyTransaction, Order, OrderDetail,
        OrderItem, OrderNote, Product, Review, StatusChange, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        admin, admin_catalog, auth, cart, catalog, customer, health, kitchen, orders, params,
        payment, pdv, table_menu,
    },
    settings::StoreSettings,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "User token from /api/auth/login or table token from /api/mesa/login",
                    ))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        catalog::list_products,
        catalog::get_product,
        catalog::product_reviews,
        catalog::list_categories,
        catalog::list_extras,
        catalog::store_settings,
        cart::view_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        orders::order_status,
        customer::loyalty_summary,
        customer::redeem_points,
        customer::create_review,
        customer::update_review,
        customer::delete_review,
        customer::list_wishlist,
        customer::check_wishlist,
        customer::add_to_wishlist,
        customer::remove_from_wishlist,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::accept_order,
        admin::reject_order,
        admin::update_estimated_time,
        admin::add_note,
        admin::confirm_payment,
        admin::order_statistics,
        admin::list_low_stock,
        admin::adjust_inventory,
        admin::get_settings,
        admin::update_settings,
        admin_catalog::list_products,
        admin_catalog::create_product,
        admin_catalog::update_product,
        admin_catalog::delete_product,
        admin_catalog::create_category,
        admin_catalog::update_category,
        admin_catalog::delete_category,
        admin_catalog::list_extras,
        admin_catalog::create_extra,
        admin_catalog::update_extra,
        admin_catalog::delete_extra,
        admin_catalog::list_coupons,
        admin_catalog::create_coupon,
        admin_catalog::update_coupon,
        admin_catalog::toggle_coupon,
        admin_catalog::delete_coupon,
        kitchen::board,
        kitchen::update_order_status,
        kitchen::update_order_item_status,
        kitchen::update_comanda_item_status,
        pdv::list_tables,
        pdv::create_table,
        pdv::open_table,
        pdv::close_table,
        pdv::set_table_status,
        pdv::table_access,
        pdv::list_open_comandas,
        pdv::create_comanda,
        pdv::get_comanda,
        pdv::add_item,
        pdv::remove_item,
        pdv::close_comanda,
        pdv::current_register,
        pdv::open_cash_register,
        pdv::close_cash_register,
        pdv::add_movement,
        pdv::register_history,
        table_menu::login,
        table_menu::comanda,
        table_menu::add_item,
        payment::webhook
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            Extra,
            Coupon,
            Order,
            OrderItem,
            OrderNote,
            OrderDetail,
            StatusChange,
            CartLine,
            CartView,
            DiningTable,
            Comanda,
            ComandaItem,
            ComandaDetail,
            CashRegister,
            CashMovement,
            LoyaltyTransaction,
            Review,
            StoreSettings,
            auth_dto::RegisterRequest,
            auth_dto::LoginRequest,
            auth_dto::LoginResponse,
            cart_dto::AddToCartRequest,
            cart_dto::UpdateCartItemRequest,
            catalog_dto::ProductList,
            catalog_dto::CategoryList,
            catalog_dto::ExtraList,
            coupon_dto::CouponList,
            order_dto::CheckoutRequest,
            order_dto::OrderList,
            order_dto::OrderStatusView,
            admin_dto::ActionOutcome,
            admin_dto::OrderStatistics,
            admin_dto::LowStockList,
            kitchen_dto::KitchenBoard,
            pdv_dto::RegisterSummary,
            pdv_dto::ClosedRegister,
            table_dto::TableLoginResponse,
            loyalty_dto::LoyaltySummary,
            loyalty_dto::RedeemResult,
            review_dto::ProductReviews,
            wishlist_dto::WishlistProducts,
            settings_dto::UpdateSettingsRequest,
            payment_dto::PaymentWebhook,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<OrderDetail>,
            ApiResponse<order_dto::OrderList>,
            ApiResponse<ComandaDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Customer registration and login"),
        (name = "Catalog", description = "Public menu and store settings"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Checkout and order tracking"),
        (name = "Loyalty", description = "Points and rewards"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Wishlist", description = "Saved products"),
        (name = "Admin", description = "Order management, stock and settings"),
        (name = "Admin Catalog", description = "Products, categories, extras and coupons"),
        (name = "Kitchen", description = "Kitchen display"),
        (name = "PDV", description = "Tables, comandas and cash register"),
        (name = "Table", description = "Guest self-service at the table"),
        (name = "Payment", description = "Payment gateway callbacks"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
