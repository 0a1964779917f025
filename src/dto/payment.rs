use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Gateway callback body. `external_reference` carries our order id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhook {
    pub external_reference: String,
    pub status: String,
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub processed: bool,
}
