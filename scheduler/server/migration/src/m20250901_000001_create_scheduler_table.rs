use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scheduler::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scheduler::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Scheduler::Date)
                            .char_len(8)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Scheduler::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Scheduler::Comment).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Scheduler::Repeat)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scheduler::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Scheduler {
    Table,
    Id,
    Date,
    Title,
    Comment,
    Repeat,
}
