use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub order_code: String,
    pub subtotal: i64,
    pub discount_amount: i64,
    pub shipping_cost: i64,
    pub total: i64,
    pub coupon_code: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub payment_confirmed_by: Option<Uuid>,
    pub payment_confirmed_at: Option<DateTimeWithTimeZone>,
    pub payment_confirmation_notes: Option<String>,
    pub delivery_type: String,
    pub delivery_address: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub observations: Option<String>,
    pub estimated_prep_time: i32,
    pub estimated_delivery_time: i32,
    pub accepted_at: Option<DateTimeWithTimeZone>,
    pub received_at: Option<DateTimeWithTimeZone>,
    pub preparing_at: Option<DateTimeWithTimeZone>,
    pub ready_at: Option<DateTimeWithTimeZone>,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
