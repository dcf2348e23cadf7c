use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_table::DiaryEntries;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // entry_uuid is only unique per owning user
        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_user_uuid")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::UserId)
                    .col(DiaryEntries::EntryUuid)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_user_date")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::UserId)
                    .col(DiaryEntries::EntryDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_diary_entries_user_date")
                    .table(DiaryEntries::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_diary_entries_user_uuid")
                    .table(DiaryEntries::Table)
                    .to_owned(),
            )
            .await
    }
}
