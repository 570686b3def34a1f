use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Foreign keys are declared inline so the schema also applies on
        // SQLite, which cannot add them after table creation.
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_auto(Projects::Id))
                    .col(string(Projects::Title))
                    .col(text(Projects::Description))
                    .col(string(Projects::Year))
                    .col(json_null(Projects::Tags))
                    .col(string_len(Projects::Status, 32).default("open"))
                    .col(integer(Projects::ProfessorId))
                    .col(
                        timestamp_with_time_zone(Projects::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_professor_id")
                            .from(Projects::Table, Projects::ProfessorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_professor_id")
                    .table(Projects::Table)
                    .col(Projects::ProfessorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectResources::Table)
                    .if_not_exists()
                    .col(pk_auto(ProjectResources::Id))
                    .col(integer(ProjectResources::ProjectId))
                    .col(string(ProjectResources::Filename))
                    .col(string(ProjectResources::Handle))
                    .col(
                        timestamp_with_time_zone(ProjectResources::UploadedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_resources_project_id")
                            .from(ProjectResources::Table, ProjectResources::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_resources_project_id")
                    .table(ProjectResources::Table)
                    .col(ProjectResources::ProjectId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProjectResources::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Projects {
    Table,
    Id,
    Title,
    Description,
    Year,
    Tags,
    Status,
    ProfessorId,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ProjectResources {
    Table,
    Id,
    ProjectId,
    Filename,
    Handle,
    UploadedAt,
}
