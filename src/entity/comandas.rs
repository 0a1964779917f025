use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comandas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub comanda_number: String,
    pub table_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub status: String,
    pub total: i64,
    pub opened_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
    pub waiter_id: Option<Uuid>,
    pub access_pin: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::dining_tables::Entity",
        from = "Column::TableId",
        to = "super::dining_tables::Column::Id"
    )]
    DiningTables,
    #[sea_orm(has_many = "super::comanda_items::Entity")]
    ComandaItems,
}

impl Related<super::dining_tables::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiningTables.def()
    }
}

impl Related<super::comanda_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComandaItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
