use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::status::{ComandaItemStatus, OrderStatus},
    models::{ComandaItemDetail, OrderDetail},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct KitchenOrderStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ComandaItemStatusRequest {
    pub status: ComandaItemStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenComandaItem {
    pub comanda_id: Uuid,
    pub comanda_number: String,
    pub table_id: Option<Uuid>,
    pub detail: ComandaItemDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct KitchenBoard {
    pub orders: Vec<OrderDetail>,
    pub comanda_items: Vec<KitchenComandaItem>,
}
