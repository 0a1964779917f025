//! Loyalty points: one point per whole currency unit spent, redeemable for
//! fixed-value coupons at three tiers.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::whole_units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RewardTier {
    pub points: i32,
    /// Coupon value in cents.
    pub discount: i64,
}

pub const REWARD_TIERS: [RewardTier; 3] = [
    RewardTier {
        points: 100,
        discount: 1_000,
    },
    RewardTier {
        points: 250,
        discount: 3_000,
    },
    RewardTier {
        points: 500,
        discount: 7_000,
    },
];

pub const COUPON_VALIDITY_DAYS: i64 = 30;

pub const EARN: &str = "earn";
pub const REDEEM: &str = "redeem";

pub fn tier_for(points: i32) -> Option<RewardTier> {
    REWARD_TIERS.into_iter().find(|tier| tier.points == points)
}

pub fn points_for_total(total_cents: i64) -> i32 {
    i32::try_from(whole_units(total_cents).max(0)).unwrap_or(i32::MAX)
}

pub fn available_rewards(balance: i32) -> Vec<RewardTier> {
    REWARD_TIERS
        .into_iter()
        .filter(|tier| tier.points <= balance)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedeemRejection {
    #[error("Insufficient points: {balance} available, {requested} required")]
    InsufficientPoints { balance: i32, requested: i32 },
    #[error("Invalid reward option: {0} points")]
    UnknownTier(i32),
}

/// Balance is checked before the tier, so an unaffordable request reports the shortfall.
pub fn check_redeem(balance: i32, requested: i32) -> Result<RewardTier, RedeemRejection> {
    if balance < requested {
        return Err(RedeemRejection::InsufficientPoints { balance, requested });
    }
    tier_for(requested).ok_or(RedeemRejection::UnknownTier(requested))
}

pub fn reward_coupon_code(now: DateTime<Utc>) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "FIDELIDADE-{}-{}",
        token[..8].to_uppercase(),
        now.format("%Y%m%d%H%M%S")
    )
}

pub fn reward_coupon_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(COUPON_VALIDITY_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_truncate_to_whole_units() {
        assert_eq!(points_for_total(5_780), 57);
        assert_eq!(points_for_total(99), 0);
        assert_eq!(points_for_total(-500), 0);
    }

    #[test]
    fn redeem_below_balance_is_rejected() {
        assert_eq!(
            check_redeem(200, 250),
            Err(RedeemRejection::InsufficientPoints {
                balance: 200,
                requested: 250,
            })
        );
    }

    #[test]
    fn redeem_requires_a_known_tier() {
        assert_eq!(check_redeem(400, 300), Err(RedeemRejection::UnknownTier(300)));
        assert_eq!(check_redeem(400, 250).map(|t| t.discount), Ok(3_000));
    }

    #[test]
    fn rewards_listed_up_to_balance() {
        let tiers: Vec<i32> = available_rewards(260).iter().map(|t| t.points).collect();
        assert_eq!(tiers, vec![100, 250]);
        assert!(available_rewards(99).is_empty());
    }

    #[test]
    fn reward_code_shape() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T12:30:45Z")
            .unwrap()
            .with_timezone(&Utc);
        let code = reward_coupon_code(now);
        assert!(code.starts_with("FIDELIDADE-"));
        assert!(code.ends_with("-20260301123045"));
        assert_eq!(code.len(), "FIDELIDADE-".len() + 8 + 1 + 14);
        assert_eq!(reward_coupon_expiry(now) - now, Duration::days(30));
    }
}
