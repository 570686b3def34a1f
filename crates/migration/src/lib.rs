pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users_table;
mod m20250101_000002_create_projects_tables;
mod m20250101_000003_create_teams_tables;
mod m20250101_000004_create_application_tables;
mod m20250101_000005_create_milestone_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users_table::Migration),
            Box::new(m20250101_000002_create_projects_tables::Migration),
            Box::new(m20250101_000003_create_teams_tables::Migration),
            Box::new(m20250101_000004_create_application_tables::Migration),
            Box::new(m20250101_000005_create_milestone_tables::Migration),
        ]
    }
}

/// Database connection helper for CLI usage
pub async fn connect_to_database(database_url: &str) -> Result<sea_orm::DatabaseConnection, sea_orm::DbErr> {
    sea_orm::Database::connect(database_url).await
}
