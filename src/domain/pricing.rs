use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::coupon::CouponRules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    Delivery,
    Pickup,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Delivery => "delivery",
            DeliveryType::Pickup => "pickup",
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delivery" => Ok(DeliveryType::Delivery),
            "pickup" => Ok(DeliveryType::Pickup),
            other => Err(format!("unknown delivery type {other}")),
        }
    }
}

/// One priced cart or comanda line: a unit price, the per-unit extras and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: i64,
    pub extras_per_unit: i64,
    pub quantity: i32,
}

impl PricedLine {
    pub fn total(&self) -> i64 {
        (self.unit_price + self.extras_per_unit) * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    pub flat_fee: i64,
    pub free_shipping_min: i64,
}

impl ShippingPolicy {
    pub fn fee_for(&self, subtotal: i64, delivery: DeliveryType) -> i64 {
        match delivery {
            DeliveryType::Pickup => 0,
            DeliveryType::Delivery if subtotal >= self.free_shipping_min => 0,
            DeliveryType::Delivery => self.flat_fee,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Quote {
    pub subtotal: i64,
    pub discount: i64,
    pub shipping: i64,
    pub total: i64,
}

pub fn subtotal<'a>(lines: impl IntoIterator<Item = &'a PricedLine>) -> i64 {
    lines.into_iter().map(PricedLine::total).sum()
}

/// Prices a basket. The coupon, when given, must already have been validated
/// against the same subtotal.
pub fn quote(
    lines: &[PricedLine],
    coupon: Option<&CouponRules>,
    delivery: DeliveryType,
    shipping: &ShippingPolicy,
) -> Quote {
    let subtotal = subtotal(lines);
    let discount = coupon.map_or(0, |c| c.discount_for(subtotal));
    let shipping = shipping.fee_for(subtotal, delivery);
    Quote {
        subtotal,
        discount,
        shipping,
        total: subtotal - discount + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coupon::DiscountKind;

    const POLICY: ShippingPolicy = ShippingPolicy {
        flat_fee: 1_500,
        free_shipping_min: 30_000,
    };

    fn burger_pair() -> Vec<PricedLine> {
        vec![PricedLine {
            unit_price: 2_890,
            extras_per_unit: 0,
            quantity: 2,
        }]
    }

    fn fixed(value: i64) -> CouponRules {
        CouponRules {
            active: true,
            kind: DiscountKind::Fixed,
            value,
            min_purchase: 0,
            max_uses: None,
            times_used: 0,
            valid_from: None,
            valid_until: None,
        }
    }

    #[test]
    fn pickup_has_no_shipping() {
        let q = quote(&burger_pair(), None, DeliveryType::Pickup, &POLICY);
        assert_eq!(q.subtotal, 5_780);
        assert_eq!(q.shipping, 0);
        assert_eq!(q.total, 5_780);
    }

    #[test]
    fn delivery_below_threshold_pays_flat_fee() {
        let q = quote(&burger_pair(), None, DeliveryType::Delivery, &POLICY);
        assert_eq!(q.shipping, 1_500);
        assert_eq!(q.total, 7_280);
    }

    #[test]
    fn delivery_at_threshold_ships_free() {
        let lines = [PricedLine {
            unit_price: 15_000,
            extras_per_unit: 0,
            quantity: 2,
        }];
        let q = quote(&lines, None, DeliveryType::Delivery, &POLICY);
        assert_eq!(q.shipping, 0);
    }

    #[test]
    fn fixed_coupon_comes_off_subtotal() {
        let coupon = fixed(1_000);
        let q = quote(&burger_pair(), Some(&coupon), DeliveryType::Pickup, &POLICY);
        assert_eq!(q.discount, 1_000);
        assert_eq!(q.total, 4_780);

        let q = quote(&burger_pair(), Some(&coupon), DeliveryType::Delivery, &POLICY);
        assert_eq!(q.total, 6_280);
    }

    #[test]
    fn extras_are_multiplied_by_quantity() {
        let lines = [PricedLine {
            unit_price: 2_000,
            extras_per_unit: 450,
            quantity: 3,
        }];
        assert_eq!(subtotal(&lines), 7_350);
    }

    #[test]
    fn total_identity_holds_and_discount_never_exceeds_subtotal() {
        let coupon = fixed(1_000_000);
        for delivery in [DeliveryType::Pickup, DeliveryType::Delivery] {
            let q = quote(&burger_pair(), Some(&coupon), delivery, &POLICY);
            assert!(q.discount <= q.subtotal);
            assert_eq!(q.total, q.subtotal - q.discount + q.shipping);
        }
    }
}
