use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20250101_000001_create_users_table::Users,
    m20250101_000002_create_projects_tables::Projects,
    m20250101_000003_create_teams_tables::Teams,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TeamApplications::Table)
                    .if_not_exists()
                    .col(pk_auto(TeamApplications::Id))
                    .col(integer(TeamApplications::ProjectId))
                    .col(integer(TeamApplications::TeamId))
                    .col(string_len(TeamApplications::Status, 32).default("pending"))
                    .col(text_null(TeamApplications::Motivation))
                    .col(
                        timestamp_with_time_zone(TeamApplications::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_applications_project_id")
                            .from(TeamApplications::Table, TeamApplications::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_applications_team_id")
                            .from(TeamApplications::Table, TeamApplications::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One application per (project, team) pair
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_team_applications_project_team")
                    .table(TeamApplications::Table)
                    .col(TeamApplications::ProjectId)
                    .col(TeamApplications::TeamId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StudentTeamApplications::Table)
                    .if_not_exists()
                    .col(pk_auto(StudentTeamApplications::Id))
                    .col(integer(StudentTeamApplications::TeamId))
                    .col(integer(StudentTeamApplications::StudentId))
                    .col(string_len(StudentTeamApplications::Status, 32).default("pending"))
                    .col(text_null(StudentTeamApplications::Message))
                    .col(
                        timestamp_with_time_zone(StudentTeamApplications::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_team_applications_team_id")
                            .from(
                                StudentTeamApplications::Table,
                                StudentTeamApplications::TeamId,
                            )
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_team_applications_student_id")
                            .from(
                                StudentTeamApplications::Table,
                                StudentTeamApplications::StudentId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A student may re-apply after a rejection, but never hold two open
        // requests for the same team.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_join_requests_open \
                 ON student_team_applications (team_id, student_id) \
                 WHERE status <> 'rejected'",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_student_team_applications_student_id")
                    .table(StudentTeamApplications::Table)
                    .col(StudentTeamApplications::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(StudentTeamApplications::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(TeamApplications::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum TeamApplications {
    Table,
    Id,
    ProjectId,
    TeamId,
    Status,
    Motivation,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum StudentTeamApplications {
    Table,
    Id,
    TeamId,
    StudentId,
    Status,
    Message,
    CreatedAt,
}
