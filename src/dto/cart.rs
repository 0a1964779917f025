use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::pricing::DeliveryType;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExtraSelection {
    pub extra_id: Uuid,
    pub quantity: Option<i32>,
}

impl ExtraSelection {
    pub fn quantity(&self) -> i32 {
        self.quantity.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    pub observations: Option<String>,
    #[serde(default)]
    pub extras: Vec<ExtraSelection>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CartQuery {
    /// Coupon to preview against the cart.
    pub coupon: Option<String>,
    pub delivery_type: Option<DeliveryType>,
}
