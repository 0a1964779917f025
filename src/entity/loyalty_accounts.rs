use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "loyalty_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub points: i32,
    pub total_earned: i32,
    pub total_spent: i32,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loyalty_transactions::Entity")]
    LoyaltyTransactions,
}

impl Related<super::loyalty_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
