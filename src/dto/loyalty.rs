use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::loyalty::RewardTier,
    models::{Coupon, LoyaltyAccount, LoyaltyTransaction},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct LoyaltySummary {
    pub account: LoyaltyAccount,
    pub transactions: Vec<LoyaltyTransaction>,
    pub available_rewards: Vec<RewardTier>,
    pub reward_tiers: Vec<RewardTier>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub points: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RedeemResult {
    pub coupon: Coupon,
    pub account: LoyaltyAccount,
}
