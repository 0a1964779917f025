//! JSON read models. Entities stay inside services; handlers only see these.
//! All money fields are integer cents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::pricing::Quote;
use crate::entity::{
    cash_movements, cash_registers, categories, comanda_item_extras, comanda_items, comandas,
    coupons, dining_tables, extras, loyalty_accounts, loyalty_transactions, order_item_extras,
    order_items, order_notes, orders, products, reviews, status_history, users,
};

fn utc(dt: sea_orm::prelude::DateTimeWithTimeZone) -> DateTime<Utc> {
    dt.with_timezone(&Utc)
}

fn utc_opt(dt: Option<sea_orm::prelude::DateTimeWithTimeZone>) -> Option<DateTime<Utc>> {
    dt.map(utc)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub phone: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            phone: model.phone,
            role: model.role,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            image_url: model.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub featured: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            description: model.description,
            price: model.price,
            stock: model.stock,
            image_url: model.image_url,
            category_id: model.category_id,
            featured: model.featured,
            active: model.active,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Extra {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub active: bool,
}

impl From<extras::Model> for Extra {
    fn from(model: extras::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            active: model.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_type: String,
    /// Whole percent for `percentage`, cents for `fixed`.
    pub discount_value: i64,
    pub min_purchase: i64,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<coupons::Model> for Coupon {
    fn from(model: coupons::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            discount_type: model.discount_type,
            discount_value: model.discount_value,
            min_purchase: model.min_purchase,
            max_uses: model.max_uses,
            times_used: model.times_used,
            valid_from: utc_opt(model.valid_from),
            valid_until: utc_opt(model.valid_until),
            active: model.active,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_code: String,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub coupon_code: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub payment_confirmed_by: Option<Uuid>,
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    pub payment_confirmation_notes: Option<String>,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub observations: Option<String>,
    pub estimated_prep_time: i32,
    pub estimated_delivery_time: i32,
    pub accepted_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            order_code: model.order_code,
            subtotal: model.subtotal,
            discount_amount: model.discount_amount,
            shipping_cost: model.shipping_cost,
            total: model.total,
            coupon_code: model.coupon_code,
            status: model.status,
            payment_status: model.payment_status,
            payment_method: model.payment_method,
            payment_confirmed_by: model.payment_confirmed_by,
            payment_confirmed_at: utc_opt(model.payment_confirmed_at),
            payment_confirmation_notes: model.payment_confirmation_notes,
            delivery_type: model.delivery_type,
            delivery_address: model.delivery_address,
            customer_name: model.customer_name,
            customer_phone: model.customer_phone,
            observations: model.observations,
            estimated_prep_time: model.estimated_prep_time,
            estimated_delivery_time: model.estimated_delivery_time,
            accepted_at: utc_opt(model.accepted_at),
            received_at: utc_opt(model.received_at),
            preparing_at: utc_opt(model.preparing_at),
            ready_at: utc_opt(model.ready_at),
            delivered_at: utc_opt(model.delivered_at),
            created_at: utc(model.created_at),
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price frozen at checkout.
    pub price: i64,
    pub observations: Option<String>,
    pub status: String,
    pub received_at: Option<DateTime<Utc>>,
    pub preparing_at: Option<DateTime<Utc>>,
    pub ready_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
            observations: model.observations,
            status: model.status,
            received_at: utc_opt(model.received_at),
            preparing_at: utc_opt(model.preparing_at),
            ready_at: utc_opt(model.ready_at),
            delivered_at: utc_opt(model.delivered_at),
            created_at: utc(model.created_at),
        }
    }
}

/// A selected extra with its frozen unit price, on an order or comanda line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineExtra {
    pub extra_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: i64,
}

impl LineExtra {
    pub fn from_order_extra(model: order_item_extras::Model, name: String) -> Self {
        Self {
            extra_id: model.extra_id,
            name,
            quantity: model.quantity,
            price: model.price,
        }
    }

    pub fn from_comanda_extra(model: comanda_item_extras::Model, name: String) -> Self {
        Self {
            extra_id: model.extra_id,
            name,
            quantity: model.quantity,
            price: model.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub item: OrderItem,
    pub product_name: String,
    pub extras: Vec<LineExtra>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChange {
    pub id: Uuid,
    pub subject: String,
    pub subject_id: Uuid,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<status_history::Model> for StatusChange {
    fn from(model: status_history::Model) -> Self {
        Self {
            id: model.id,
            subject: model.subject,
            subject_id: model.subject_id,
            old_status: model.old_status,
            new_status: model.new_status,
            changed_by: model.changed_by,
            notes: model.notes,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderNote {
    pub id: Uuid,
    pub order_id: Uuid,
    pub note: String,
    pub created_by: Option<String>,
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl From<order_notes::Model> for OrderNote {
    fn from(model: order_notes::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            note: model.note,
            created_by: model.created_by,
            is_internal: model.is_internal,
            created_at: utc(model.created_at),
        }
    }
}

/// An order with everything the back-office and the customer page show.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
    pub history: Vec<StatusChange>,
    pub notes: Vec<OrderNote>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiningTable {
    pub id: Uuid,
    pub table_number: String,
    pub capacity: i32,
    pub status: String,
    pub current_order_id: Option<Uuid>,
    pub opened_at: Option<DateTime<Utc>>,
    pub waiter_id: Option<Uuid>,
    pub access_pin: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<dining_tables::Model> for DiningTable {
    fn from(model: dining_tables::Model) -> Self {
        Self {
            id: model.id,
            table_number: model.table_number,
            capacity: model.capacity,
            status: model.status,
            current_order_id: model.current_order_id,
            opened_at: utc_opt(model.opened_at),
            waiter_id: model.waiter_id,
            access_pin: model.access_pin,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Comanda {
    pub id: Uuid,
    pub comanda_number: String,
    pub table_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub status: String,
    pub total: i64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub waiter_id: Option<Uuid>,
    pub access_pin: Option<String>,
}

impl From<comandas::Model> for Comanda {
    fn from(model: comandas::Model) -> Self {
        Self {
            id: model.id,
            comanda_number: model.comanda_number,
            table_id: model.table_id,
            customer_name: model.customer_name,
            status: model.status,
            total: model.total,
            opened_at: utc(model.opened_at),
            closed_at: utc_opt(model.closed_at),
            waiter_id: model.waiter_id,
            access_pin: model.access_pin,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComandaItem {
    pub id: Uuid,
    pub comanda_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub status: String,
    pub sent_to_kitchen: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<comanda_items::Model> for ComandaItem {
    fn from(model: comanda_items::Model) -> Self {
        Self {
            id: model.id,
            comanda_id: model.comanda_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price: model.price,
            status: model.status,
            sent_to_kitchen: model.sent_to_kitchen,
            notes: model.notes,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComandaItemDetail {
    pub item: ComandaItem,
    pub product_name: String,
    pub extras: Vec<LineExtra>,
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComandaDetail {
    pub comanda: Comanda,
    pub table: Option<DiningTable>,
    pub items: Vec<ComandaItemDetail>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashRegister {
    pub id: Uuid,
    pub user_id: Uuid,
    pub opening_balance: i64,
    pub closing_balance: Option<i64>,
    pub expected_balance: Option<i64>,
    pub difference: Option<i64>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
}

impl From<cash_registers::Model> for CashRegister {
    fn from(model: cash_registers::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            opening_balance: model.opening_balance,
            closing_balance: model.closing_balance,
            expected_balance: model.expected_balance,
            difference: model.difference,
            opened_at: utc(model.opened_at),
            closed_at: utc_opt(model.closed_at),
            status: model.status,
            notes: model.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CashMovement {
    pub id: Uuid,
    pub cash_register_id: Uuid,
    pub movement_type: String,
    pub amount: i64,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
    pub comanda_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<cash_movements::Model> for CashMovement {
    fn from(model: cash_movements::Model) -> Self {
        Self {
            id: model.id,
            cash_register_id: model.cash_register_id,
            movement_type: model.movement_type,
            amount: model.amount,
            description: model.description,
            order_id: model.order_id,
            comanda_id: model.comanda_id,
            created_by: model.created_by,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyAccount {
    pub user_id: Uuid,
    pub points: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<loyalty_accounts::Model> for LoyaltyAccount {
    fn from(model: loyalty_accounts::Model) -> Self {
        Self {
            user_id: model.user_id,
            points: model.points,
            total_earned: model.total_earned,
            total_spent: model.total_spent,
            updated_at: utc(model.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoyaltyTransaction {
    pub id: Uuid,
    pub points: i32,
    pub transaction_type: String,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<loyalty_transactions::Model> for LoyaltyTransaction {
    fn from(model: loyalty_transactions::Model) -> Self {
        Self {
            id: model.id,
            points: model.points,
            transaction_type: model.transaction_type,
            description: model.description,
            order_id: model.order_id,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub verified_purchase: bool,
    pub created_at: DateTime<Utc>,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            verified_purchase: model.verified_purchase,
            created_at: utc(model.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub observations: Option<String>,
    pub extras: Vec<LineExtra>,
    pub line_total: i64,
}

/// The cart with live prices and the quote checkout would charge.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub quote: Quote,
    pub coupon_code: Option<String>,
    /// Why the previewed coupon was not applied.
    pub coupon_error: Option<String>,
}
