//! Business rules with no I/O: pricing, coupons, status lifecycles, cash
//! reconciliation and loyalty tiers. Services load rows, ask these modules
//! what should happen, then persist the answer.

pub mod cash;
pub mod coupon;
pub mod loyalty;
pub mod money;
pub mod pricing;
pub mod status;
