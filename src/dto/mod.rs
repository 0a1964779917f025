pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod kitchen;
pub mod loyalty;
pub mod orders;
pub mod payment;
pub mod pdv;
pub mod reviews;
pub mod settings;
pub mod table_menu;
pub mod wishlist;
