use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use super::money::{format_brl, percent_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `discount_value` is a whole percentage (0..=100).
    Percentage,
    /// `discount_value` is an amount in cents.
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(DiscountKind::Percentage),
            "fixed" => Ok(DiscountKind::Fixed),
            other => Err(format!("unknown discount type {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponRejection {
    #[error("Coupon is inactive")]
    Inactive,
    #[error("Coupon is not valid yet")]
    NotYetValid,
    #[error("Coupon has expired")]
    Expired,
    #[error("Coupon usage limit reached")]
    UsageLimitReached,
    #[error("Minimum purchase of {} required for this coupon", format_brl(*.0))]
    BelowMinimum(i64),
}

/// Everything needed to judge a coupon, detached from its row.
#[derive(Debug, Clone)]
pub struct CouponRules {
    pub active: bool,
    pub kind: DiscountKind,
    pub value: i64,
    pub min_purchase: i64,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

impl CouponRules {
    /// Validity at `now`; has no side effects.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.active {
            return Err(CouponRejection::Inactive);
        }
        if self.valid_from.is_some_and(|from| now < from) {
            return Err(CouponRejection::NotYetValid);
        }
        if self.valid_until.is_some_and(|until| now > until) {
            return Err(CouponRejection::Expired);
        }
        if let Some(max) = self.max_uses {
            if self.times_used >= max {
                return Err(CouponRejection::UsageLimitReached);
            }
        }
        Ok(())
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.check(now).is_ok()
    }

    /// Validity plus the minimum-purchase rule against a freshly computed subtotal.
    pub fn check_for_subtotal(
        &self,
        now: DateTime<Utc>,
        subtotal: i64,
    ) -> Result<(), CouponRejection> {
        self.check(now)?;
        if subtotal < self.min_purchase {
            return Err(CouponRejection::BelowMinimum(self.min_purchase));
        }
        Ok(())
    }

    /// Discount granted on `total`; never more than `total`.
    pub fn discount_for(&self, total: i64) -> i64 {
        let discount = match self.kind {
            DiscountKind::Percentage => percent_of(total, self.value),
            DiscountKind::Fixed => self.value.min(total),
        };
        discount.clamp(0, total.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rules(kind: DiscountKind, value: i64) -> CouponRules {
        CouponRules {
            active: true,
            kind,
            value,
            min_purchase: 0,
            max_uses: None,
            times_used: 0,
            valid_from: None,
            valid_until: None,
        }
    }

    #[test]
    fn open_coupon_is_valid() {
        assert!(rules(DiscountKind::Fixed, 1_000).is_valid(Utc::now()));
    }

    #[test]
    fn inactive_coupon_is_invalid() {
        let mut coupon = rules(DiscountKind::Fixed, 1_000);
        coupon.active = false;
        assert_eq!(coupon.check(Utc::now()), Err(CouponRejection::Inactive));
    }

    #[test]
    fn window_is_enforced_on_both_ends() {
        let now = Utc::now();
        let mut early = rules(DiscountKind::Fixed, 1_000);
        early.valid_from = Some(now + Duration::hours(1));
        assert_eq!(early.check(now), Err(CouponRejection::NotYetValid));

        let mut late = rules(DiscountKind::Fixed, 1_000);
        late.valid_until = Some(now - Duration::seconds(1));
        assert_eq!(late.check(now), Err(CouponRejection::Expired));

        let mut inside = rules(DiscountKind::Fixed, 1_000);
        inside.valid_from = Some(now - Duration::days(1));
        inside.valid_until = Some(now + Duration::days(1));
        assert!(inside.is_valid(now));
    }

    #[test]
    fn usage_cap_only_applies_when_set() {
        let mut capped = rules(DiscountKind::Fixed, 1_000);
        capped.max_uses = Some(1);
        capped.times_used = 1;
        assert_eq!(capped.check(Utc::now()), Err(CouponRejection::UsageLimitReached));

        let mut uncapped = rules(DiscountKind::Fixed, 1_000);
        uncapped.times_used = 10_000;
        assert!(uncapped.is_valid(Utc::now()));
    }

    #[test]
    fn percentage_discount_on_one_hundred() {
        assert_eq!(rules(DiscountKind::Percentage, 10).discount_for(10_000), 1_000);
    }

    #[test]
    fn fixed_discount_is_capped_at_total() {
        let coupon = rules(DiscountKind::Fixed, 1_000);
        assert_eq!(coupon.discount_for(5_780), 1_000);
        assert_eq!(coupon.discount_for(700), 700);
    }

    #[test]
    fn minimum_purchase_uses_subtotal() {
        let mut coupon = rules(DiscountKind::Fixed, 1_000);
        coupon.min_purchase = 6_000;
        assert_eq!(
            coupon.check_for_subtotal(Utc::now(), 5_780),
            Err(CouponRejection::BelowMinimum(6_000))
        );
        assert!(coupon.check_for_subtotal(Utc::now(), 6_000).is_ok());
    }
}
