//! Create `vacations` table.
//!
//! Date ordering and the price range are enforced with CHECK constraints as well as
//! in the service layer, so rows written by other tools keep the same invariants.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vacations::Table)
                    .if_not_exists()
                    .col(uuid(Vacations::Id).primary_key())
                    .col(string_len(Vacations::Destination, 255).not_null())
                    .col(text(Vacations::Description).not_null())
                    .col(date(Vacations::StartDate).not_null())
                    .col(date(Vacations::EndDate).not_null())
                    .col(double(Vacations::Price).not_null())
                    .col(string_len(Vacations::Image, 255).not_null())
                    .col(timestamp_with_time_zone(Vacations::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Vacations::UpdatedAt).not_null())
                    .check(Expr::col(Vacations::EndDate).gte(Expr::col(Vacations::StartDate)))
                    .check(
                        Expr::col(Vacations::Price)
                            .gt(0)
                            .and(Expr::col(Vacations::Price).lte(10000)),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Vacations::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Vacations {
    Table,
    Id,
    Destination,
    Description,
    StartDate,
    EndDate,
    Price,
    Image,
    CreatedAt,
    UpdatedAt,
}
