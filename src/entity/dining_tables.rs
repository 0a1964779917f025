use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "dining_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub table_number: String,
    pub capacity: i32,
    pub status: String,
    pub current_order_id: Option<Uuid>,
    pub opened_at: Option<DateTimeWithTimeZone>,
    pub waiter_id: Option<Uuid>,
    pub access_pin: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comandas::Entity")]
    Comandas,
}

impl Related<super::comandas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comandas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
