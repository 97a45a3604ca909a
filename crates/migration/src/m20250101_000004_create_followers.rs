//! Create `followers` join table between users and vacations.
//!
//! The composite primary key makes (user, vacation) unique; both FKs cascade so
//! deleting a vacation or a user drops its follow relations.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Followers::Table)
                    .if_not_exists()
                    .col(uuid(Followers::UserId).not_null())
                    .col(uuid(Followers::VacationId).not_null())
                    .col(timestamp_with_time_zone(Followers::CreatedAt).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_followers")
                            .col(Followers::UserId)
                            .col(Followers::VacationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_user")
                            .from(Followers::Table, Followers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_vacation")
                            .from(Followers::Table, Followers::VacationId)
                            .to(Vacations::Table, Vacations::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Followers::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Followers { Table, UserId, VacationId, CreatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }

#[derive(DeriveIden)]
enum Vacations { Table, Id }
