//! Create `users` table.
//!
//! Holds account profile data; the admin flag drives role checks.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(string_len(Users::FirstName, 128).not_null())
                    .col(string_len(Users::LastName, 128).not_null())
                    .col(string_len(Users::Email, 255).unique_key().not_null())
                    .col(boolean(Users::IsAdmin).not_null().default(false))
                    .col(timestamp_with_time_zone(Users::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, FirstName, LastName, Email, IsAdmin, CreatedAt }
