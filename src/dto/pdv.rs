use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    domain::{cash::{MovementKind, Reconciliation}, status::TableStatus},
    dto::cart::ExtraSelection,
    models::{CashMovement, CashRegister, Comanda, DiningTable},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    pub table_number: String,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TableStatusRequest {
    pub status: TableStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TableList {
    pub items: Vec<DiningTable>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComandaRequest {
    pub table_id: Option<Uuid>,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComandaList {
    pub items: Vec<Comanda>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddComandaItemRequest {
    pub product_id: Uuid,
    pub quantity: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub extras: Vec<ExtraSelection>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CloseComandaRequest {
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenRegisterRequest {
    pub opening_balance: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseRegisterRequest {
    pub closing_balance: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CashMovementRequest {
    pub movement_type: MovementKind,
    pub amount: i64,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
    pub comanda_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterSummary {
    pub register: CashRegister,
    pub movements: Vec<CashMovement>,
    pub expected_balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClosedRegister {
    pub register: CashRegister,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterHistory {
    pub items: Vec<CashRegister>,
}
