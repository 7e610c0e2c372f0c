//! Story database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Story;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "stories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub challenge_id: i64,
    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    pub report_count: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::challenge::Entity",
        from = "Column::ChallengeId",
        to = "super::challenge::Column::Id",
        on_delete = "Cascade"
    )]
    Challenge,
}

impl Related<super::challenge::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Challenge.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Story {
    fn from(model: Model) -> Self {
        Story {
            id: model.id,
            user_id: model.user_id,
            challenge_id: model.challenge_id,
            image_url: model.image_url,
            report_count: model.report_count,
            created_at: model.created_at,
        }
    }
}
