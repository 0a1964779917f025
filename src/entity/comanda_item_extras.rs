use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "comanda_item_extras")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub comanda_item_id: Uuid,
    pub extra_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comanda_items::Entity",
        from = "Column::ComandaItemId",
        to = "super::comanda_items::Column::Id"
    )]
    ComandaItems,
}

impl Related<super::comanda_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComandaItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
