pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod coupon_service;
pub mod detail;
pub mod kitchen_service;
pub mod lifecycle;
pub mod loyalty_service;
pub mod order_service;
pub mod payment_service;
pub mod pdv_service;
pub mod review_service;
pub mod table_service;
pub mod wishlist_service;
