use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comanda_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub comanda_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub status: String,
    pub sent_to_kitchen: bool,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comandas::Entity",
        from = "Column::ComandaId",
        to = "super::comandas::Column::Id"
    )]
    Comandas,
    #[sea_orm(has_many = "super::comanda_item_extras::Entity")]
    ComandaItemExtras,
}

impl Related<super::comandas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comandas.def()
    }
}

impl Related<super::comanda_item_extras::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComandaItemExtras.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
