use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create Users Table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::UserId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::DeviceId)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Create Diary Entries Table
        manager
            .create_table(
                Table::create()
                    .table(DiaryEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DiaryEntries::EntryId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DiaryEntries::UserId).integer().not_null())
                    .col(ColumnDef::new(DiaryEntries::EntryUuid).string_len(36).not_null())
                    .col(ColumnDef::new(DiaryEntries::EntryDate).date_time().not_null())
                    .col(ColumnDef::new(DiaryEntries::MoodScore).integer().not_null())
                    .col(ColumnDef::new(DiaryEntries::MoodPercentage).integer().not_null())
                    .col(ColumnDef::new(DiaryEntries::Activities).json_binary().not_null())
                    .col(ColumnDef::new(DiaryEntries::Notes).text().not_null())
                    .col(ColumnDef::new(DiaryEntries::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(DiaryEntries::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-diary_entry-user_id")
                            .from(DiaryEntries::Table, DiaryEntries::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DiaryEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Users {
    Table,
    UserId,
    DeviceId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(super) enum DiaryEntries {
    Table,
    EntryId,
    UserId,
    EntryUuid,
    EntryDate,
    MoodScore,
    MoodPercentage,
    Activities,
    Notes,
    CreatedAt,
    UpdatedAt,
}
