use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{domain::pricing::DeliveryType, models::Order};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub delivery_type: DeliveryType,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: Option<String>,
    pub observations: Option<String>,
    pub coupon_code: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

/// What the customer's status page polls.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatusView {
    pub id: Uuid,
    pub order_code: String,
    pub status: String,
    pub payment_status: String,
    pub total: i64,
    pub estimated_prep_time: i32,
    pub estimated_delivery_time: i32,
    pub accepted_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderStatusView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_code: order.order_code,
            status: order.status,
            payment_status: order.payment_status,
            total: order.total,
            estimated_prep_time: order.estimated_prep_time,
            estimated_delivery_time: order.estimated_delivery_time,
            accepted_at: order.accepted_at,
            ready_at: order.ready_at,
            delivered_at: order.delivered_at,
            updated_at: order.updated_at,
        }
    }
}
