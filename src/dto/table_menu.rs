use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TableLoginRequest {
    pub table_number: String,
    pub pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableLoginResponse {
    pub token: String,
    pub table_id: Uuid,
    pub table_number: String,
    pub comanda_id: Uuid,
    pub comanda_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableAccess {
    pub table_number: String,
    /// Link printed on the table's QR code.
    pub access_url: String,
}
