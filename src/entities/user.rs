use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A registered device. `device_id` is the only external identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(unique)]
    pub device_id: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::diary_entry::Entity")]
    DiaryEntry,
}

impl Related<super::diary_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
