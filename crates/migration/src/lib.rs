//! Migrator registering entity-specific migrations in dependency order.
//! Column changes after the initial schema follow the index migration.
pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_user_credentials;
mod m20250101_000003_create_vacations;
mod m20250101_000004_create_followers;
mod m20250101_000005_add_indexes;
mod m20250101_000006_widen_destination;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_user_credentials::Migration),
            Box::new(m20250101_000003_create_vacations::Migration),
            Box::new(m20250101_000004_create_followers::Migration),
            Box::new(m20250101_000005_add_indexes::Migration),
            Box::new(m20250101_000006_widen_destination::Migration),
        ]
    }
}
