use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::status::OrderStatus,
    models::{Order, Product},
    routes::params::Pagination,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EstimatedTimeRequest {
    pub estimated_prep_time: Option<i32>,
    pub estimated_delivery_time: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddNoteRequest {
    pub note: String,
    #[serde(default = "default_internal")]
    pub is_internal: bool,
}

fn default_internal() -> bool {
    true
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Result of a guarded action: `applied` is false when nothing changed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionOutcome {
    pub applied: bool,
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub by_status: Vec<StatusCount>,
    /// Sum of totals of confirmed, shipped and delivered orders, in cents.
    pub revenue: i64,
    pub average_ticket: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub threshold: Option<i32>,
}

impl LowStockQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.per_page)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LowStockList {
    pub items: Vec<Product>,
}
