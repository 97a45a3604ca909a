use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing order and the upcoming/active predicates
        manager
            .create_index(
                Index::create()
                    .name("idx_vacations_start_date")
                    .table(Vacations::Table)
                    .col(Vacations::StartDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Report ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_vacations_destination")
                    .table(Vacations::Table)
                    .col(Vacations::Destination)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Follower counts aggregate by vacation; the PK already leads with user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_followers_vacation")
                    .table(Followers::Table)
                    .col(Followers::VacationId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_vacations_start_date").table(Vacations::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_vacations_destination").table(Vacations::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_followers_vacation").table(Followers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Vacations { Table, StartDate, Destination }

#[derive(DeriveIden)]
enum Followers { Table, VacationId }
