use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub store_name: Option<String>,
    pub store_description: Option<String>,
    pub pickup_enabled: Option<bool>,
    pub pickup_address: Option<String>,
    pub delivery_enabled: Option<bool>,
    pub shipping_cost: Option<i64>,
    pub free_shipping_min: Option<i64>,
}
