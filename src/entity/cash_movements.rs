use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cash_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cash_register_id: Uuid,
    pub movement_type: String,
    pub amount: i64,
    pub description: Option<String>,
    pub order_id: Option<Uuid>,
    pub comanda_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash_registers::Entity",
        from = "Column::CashRegisterId",
        to = "super::cash_registers::Column::Id"
    )]
    CashRegisters,
}

impl Related<super::cash_registers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashRegisters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
