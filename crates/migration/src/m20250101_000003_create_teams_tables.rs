use sea_orm_migration::{prelude::*, schema::*};

use crate::{
    m20250101_000001_create_users_table::Users,
    m20250101_000002_create_projects_tables::Projects,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(pk_auto(Teams::Id))
                    .col(string(Teams::Name))
                    .col(integer_null(Teams::ProjectId))
                    .col(integer(Teams::LeaderId))
                    .col(boolean(Teams::IsLocked).default(false))
                    .col(string_len(Teams::Status, 32).default("pending"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_project_id")
                            .from(Teams::Table, Teams::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_leader_id")
                            .from(Teams::Table, Teams::LeaderId)
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
                    .name("idx_teams_project_id")
                    .table(Teams::Table)
                    .col(Teams::ProjectId)
                    .to_owned(),
            )
            .await?;

        // At most one approved team per project. A partial unique index makes
        // the store itself reject the second concurrent approval; the same
        // syntax is valid on Postgres and SQLite.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_teams_project_approved \
                 ON teams (project_id) WHERE status = 'approved'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TeamMembers::Table)
                    .if_not_exists()
                    .col(pk_auto(TeamMembers::Id))
                    .col(integer(TeamMembers::TeamId))
                    .col(integer(TeamMembers::StudentId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMembers::Table, TeamMembers::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_student_id")
                            .from(TeamMembers::Table, TeamMembers::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create unique constraint to prevent duplicate memberships
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_team_members_team_student")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::TeamId)
                    .col(TeamMembers::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_student_id")
                    .table(TeamMembers::Table)
                    .col(TeamMembers::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamMembers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Teams {
    Table,
    Id,
    Name,
    ProjectId,
    LeaderId,
    IsLocked,
    Status,
}

#[derive(DeriveIden)]
pub enum TeamMembers {
    Table,
    Id,
    TeamId,
    StudentId,
}
