use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "diary_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub entry_id: i32,
    pub user_id: i32,
    pub entry_uuid: String,
    pub entry_date: DateTime,
    pub mood_score: i32,
    pub mood_percentage: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub activities: Activities,
    #[sea_orm(column_type = "Text")]
    pub notes: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Activity labels in the order the client sent them, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Activities(pub Vec<String>);

impl From<Vec<String>> for Activities {
    fn from(items: Vec<String>) -> Self {
        Self(items)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::UserId",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
