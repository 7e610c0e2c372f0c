//! Challenge database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Challenge;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "challenges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::story::Entity")]
    Story,
}

impl Related<super::story::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Story.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Challenge {
    fn from(model: Model) -> Self {
        Challenge {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
        }
    }
}
