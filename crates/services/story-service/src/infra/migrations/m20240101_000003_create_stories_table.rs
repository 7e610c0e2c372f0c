//! Migration: Create stories table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Stories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stories::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Stories::ChallengeId).big_integer().not_null())
                    .col(ColumnDef::new(Stories::ImageUrl).text().not_null())
                    .col(
                        ColumnDef::new(Stories::ReportCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Stories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_stories_challenge_id")
                            .from(Stories::Table, Stories::ChallengeId)
                            .to(Challenges::Table, Challenges::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Stories are always listed per (user, challenge)
        manager
            .create_index(
                Index::create()
                    .name("idx_stories_user_challenge")
                    .table(Stories::Table)
                    .col(Stories::UserId)
                    .col(Stories::ChallengeId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_stories_user_challenge")
                    .table(Stories::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Stories::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Stories {
    Table,
    Id,
    UserId,
    ChallengeId,
    ImageUrl,
    ReportCount,
    CreatedAt,
}

#[derive(Iden)]
enum Challenges {
    Table,
    Id,
}
