use sea_orm_migration::{prelude::*, schema::*};

use crate::{
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
                    .table(Milestones::Table)
                    .if_not_exists()
                    .col(pk_auto(Milestones::Id))
                    .col(integer(Milestones::ProjectId))
                    .col(string(Milestones::Title))
                    .col(text_null(Milestones::Description))
                    .col(date(Milestones::DueDate))
                    .col(float(Milestones::Weightage))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestones_project_id")
                            .from(Milestones::Table, Milestones::ProjectId)
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
                    .name("idx_milestones_project_id")
                    .table(Milestones::Table)
                    .col(Milestones::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MilestoneSubmissions::Table)
                    .if_not_exists()
                    .col(pk_auto(MilestoneSubmissions::Id))
                    .col(integer(MilestoneSubmissions::MilestoneId))
                    .col(integer(MilestoneSubmissions::TeamId))
                    .col(
                        timestamp_with_time_zone(MilestoneSubmissions::SubmittedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(text_null(MilestoneSubmissions::Body))
                    .col(float_null(MilestoneSubmissions::Grade))
                    .col(text_null(MilestoneSubmissions::Feedback))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestone_submissions_milestone_id")
                            .from(
                                MilestoneSubmissions::Table,
                                MilestoneSubmissions::MilestoneId,
                            )
                            .to(Milestones::Table, Milestones::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_milestone_submissions_team_id")
                            .from(MilestoneSubmissions::Table, MilestoneSubmissions::TeamId)
                            .to(Teams::Table, Teams::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Single submission slot per milestone
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_milestone_submissions_milestone")
                    .table(MilestoneSubmissions::Table)
                    .col(MilestoneSubmissions::MilestoneId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_milestone_submissions_team_id")
                    .table(MilestoneSubmissions::Table)
                    .col(MilestoneSubmissions::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubmissionDocuments::Table)
                    .if_not_exists()
                    .col(pk_auto(SubmissionDocuments::Id))
                    .col(integer(SubmissionDocuments::SubmissionId))
                    .col(string(SubmissionDocuments::Filename))
                    .col(string(SubmissionDocuments::Handle))
                    .col(
                        timestamp_with_time_zone(SubmissionDocuments::UploadedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_submission_documents_submission_id")
                            .from(
                                SubmissionDocuments::Table,
                                SubmissionDocuments::SubmissionId,
                            )
                            .to(
                                MilestoneSubmissions::Table,
                                MilestoneSubmissions::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submission_documents_submission_id")
                    .table(SubmissionDocuments::Table)
                    .col(SubmissionDocuments::SubmissionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubmissionDocuments::Table).to_owned())
            .await?;

        manager
            .drop_table(
                Table::drop()
                    .table(MilestoneSubmissions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Milestones::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Milestones {
    Table,
    Id,
    ProjectId,
    Title,
    Description,
    DueDate,
    Weightage,
}

#[derive(DeriveIden)]
pub enum MilestoneSubmissions {
    Table,
    Id,
    MilestoneId,
    TeamId,
    SubmittedAt,
    Body,
    Grade,
    Feedback,
}

#[derive(DeriveIden)]
pub enum SubmissionDocuments {
    Table,
    Id,
    SubmissionId,
    Filename,
    Handle,
    UploadedAt,
}
