//! # Project Aggregation Views
//!
//! Read-only composition of project, team, milestone and submission state
//! into reporting shapes. No mutation happens here; missing user links
//! render as "Unknown" rather than failing the whole view.

use axum::Json;
use entity::{
    milestone_submissions::{Column as SubmissionColumn, Entity as MilestoneSubmissions},
    milestones::{Column as MilestoneColumn, Entity as Milestones},
    project_resources::{Column as ResourceColumn, Entity as ProjectResources},
    projects::Entity as Projects,
    sea_orm_active_enums::TeamStatus,
    submission_documents::{Column as DocumentColumn, Entity as SubmissionDocuments},
    team_applications::{Column as ApplicationColumn, Entity as TeamApplications},
    team_members::{Column as MemberColumn, Entity as TeamMembers},
    teams::{Column as TeamColumn, Entity as Teams},
    users::Entity as Users,
};
use error::{AppError, Result};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::Serialize;

use crate::{
    dto::teams::TeamMemberInfo,
    middleware::auth::Principal,
    projects::{decode_tags, project_progress},
    users::display_or_unknown,
    AppState,
};

/// A milestone in the detailed project view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneOverview {
    /// Milestone ID
    pub id:          i32,
    /// Milestone title
    pub title:       String,
    /// Milestone description
    pub description: Option<String>,
    /// Due date (RFC 3339 date)
    pub due_date:    String,
    /// Percentage contribution to the project grade
    pub weightage:   f32,
}

/// Per-milestone submission state for a team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneSubmissionState {
    /// The milestone this state refers to
    pub milestone_id:    i32,
    /// Whether the slot is taken
    pub submitted:       bool,
    /// Submission timestamp, when submitted (RFC 3339)
    pub submission_date: Option<String>,
    /// Names of attached files
    pub files:           Vec<String>,
    /// Feedback, when provided
    pub feedback:        Option<String>,
    /// Grade, when graded
    pub grade:           Option<f32>,
}

/// A team in the detailed project view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTeamView {
    /// Team ID
    pub id:                   i32,
    /// Team name
    pub name:                 String,
    /// Team (or application) status
    pub status:               String,
    /// Resolved members
    pub members:              Vec<TeamMemberInfo>,
    /// Submission state per milestone; empty for non-approved teams
    pub submitted_milestones: Vec<MilestoneSubmissionState>,
}

/// The detailed project view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedProjectResponse {
    /// Project ID
    pub id:            i32,
    /// Project title
    pub title:         String,
    /// Project description
    pub description:   String,
    /// Project status
    pub status:        String,
    /// Completion percentage, scoped to the approved team
    pub progress:      u32,
    /// Latest milestone due date (RFC 3339 date)
    pub due_date:      Option<String>,
    /// Member count of the approved team
    pub student_count: u64,
    /// Tags
    pub tags:          Vec<String>,
    /// Academic year
    pub academic_year: String,
    /// Attached resource filenames
    pub documents:     Vec<String>,
    /// Milestones
    pub milestones:    Vec<MilestoneOverview>,
    /// Approved team first, then applicant teams
    pub teams:         Vec<ProjectTeamView>,
}

/// An upcoming deadline on the student dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingDeadline {
    /// Milestone title
    pub milestone: String,
    /// Due date (RFC 3339 date)
    pub date:      String,
}

/// A project card on the student dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveProjectResponse {
    /// Project ID
    pub id:                i32,
    /// Project title
    pub title:             String,
    /// Professor full name, "Unknown" when the user row is missing
    pub professor:         String,
    /// Project status
    pub status:            String,
    /// The student's team on this project
    pub team_id:           i32,
    /// Team name
    pub team_name:         String,
    /// Resolved team members
    pub team_members:      Vec<TeamMemberInfo>,
    /// Title of the next unsubmitted milestone
    pub current_milestone: String,
    /// Completion percentage for this team
    pub progress:          u32,
    /// Unsubmitted milestones with their due dates
    pub due_dates:         Vec<UpcomingDeadline>,
    /// Whether the project is completed
    pub is_completed:      bool,
}

/// Compose the detailed view of a project
pub async fn detailed_project_handler(
    state: &AppState,
    _principal: Principal,
    project_id: i32,
) -> Result<Json<DetailedProjectResponse>> {
    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let milestones = Milestones::find()
        .filter(MilestoneColumn::ProjectId.eq(project_id))
        .all(&state.db)
        .await?;

    let documents = ProjectResources::find()
        .filter(ResourceColumn::ProjectId.eq(project_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|r| r.filename)
        .collect();

    let approved_team = Teams::find()
        .filter(TeamColumn::ProjectId.eq(project_id))
        .filter(TeamColumn::Status.eq(TeamStatus::Approved))
        .one(&state.db)
        .await?;

    let mut teams = Vec::new();
    let mut student_count = 0;

    if let Some(ref team) = approved_team {
        let members = resolve_members(&state.db, team).await?;
        student_count = members.len() as u64;

        // Submission state for every milestone, submitted or not
        let mut states = Vec::with_capacity(milestones.len());
        for milestone in &milestones {
            let submission = MilestoneSubmissions::find()
                .filter(SubmissionColumn::MilestoneId.eq(milestone.id))
                .filter(SubmissionColumn::TeamId.eq(team.id))
                .one(&state.db)
                .await?;

            let files = match &submission {
                Some(s) => {
                    SubmissionDocuments::find()
                        .filter(DocumentColumn::SubmissionId.eq(s.id))
                        .all(&state.db)
                        .await?
                        .into_iter()
                        .map(|d| d.filename)
                        .collect()
                },
                None => vec![],
            };

            states.push(MilestoneSubmissionState {
                milestone_id:    milestone.id,
                submitted:       submission.is_some(),
                submission_date: submission.as_ref().map(|s| s.submitted_at.to_rfc3339()),
                files,
                feedback:        submission.as_ref().and_then(|s| s.feedback.clone()),
                grade:           submission.and_then(|s| s.grade),
            });
        }

        teams.push(ProjectTeamView {
            id: team.id,
            name: team.name.clone(),
            status: team.status.to_string(),
            members,
            submitted_milestones: states,
        });
    }

    // Applicant teams that did not win the slot, shown with empty
    // submission lists
    let applications = TeamApplications::find()
        .filter(ApplicationColumn::ProjectId.eq(project_id))
        .all(&state.db)
        .await?;
    for application in applications {
        if approved_team.as_ref().is_some_and(|t| t.id == application.team_id) {
            continue;
        }
        let Some(team) = Teams::find_by_id(application.team_id).one(&state.db).await? else {
            continue;
        };
        let members = resolve_members(&state.db, &team).await?;
        teams.push(ProjectTeamView {
            id: team.id,
            name: team.name,
            status: application.status.to_string(),
            members,
            submitted_milestones: vec![],
        });
    }

    let progress = project_progress(&state.db, project_id).await?;
    let due_date = milestones.iter().map(|m| m.due_date).max().map(|d| d.to_string());

    Ok(Json(DetailedProjectResponse {
        id: project.id,
        title: project.title,
        description: project.description,
        status: project.status.to_string(),
        progress,
        due_date,
        student_count,
        tags: decode_tags(&project.tags),
        academic_year: project.year,
        documents,
        milestones: milestones
            .into_iter()
            .map(|m| {
                MilestoneOverview {
                    id:          m.id,
                    title:       m.title,
                    description: m.description,
                    due_date:    m.due_date.to_string(),
                    weightage:   m.weightage,
                }
            })
            .collect(),
        teams,
    }))
}

/// The acting student's active projects, one card per team assignment
pub async fn active_projects_handler(
    state: &AppState,
    principal: Principal,
) -> Result<Json<Vec<ActiveProjectResponse>>> {
    principal.require_student()?;

    let memberships = TeamMembers::find()
        .filter(MemberColumn::StudentId.eq(principal.id))
        .all(&state.db)
        .await?;
    let team_ids: Vec<i32> = memberships.iter().map(|m| m.team_id).collect();

    let teams = Teams::find()
        .filter(TeamColumn::Id.is_in(team_ids))
        .all(&state.db)
        .await?;

    let mut cards = Vec::new();
    for team in teams {
        let Some(project_id) = team.project_id else {
            continue;
        };
        let Some(project) = Projects::find_by_id(project_id).one(&state.db).await? else {
            continue;
        };

        let professor = Users::find_by_id(project.professor_id).one(&state.db).await?;
        let team_members = resolve_members(&state.db, &team).await?;

        let milestones = Milestones::find()
            .filter(MilestoneColumn::ProjectId.eq(project_id))
            .all(&state.db)
            .await?;

        let mut completed = 0usize;
        let mut due_dates = Vec::new();
        for milestone in &milestones {
            let submission = MilestoneSubmissions::find()
                .filter(SubmissionColumn::MilestoneId.eq(milestone.id))
                .filter(SubmissionColumn::TeamId.eq(team.id))
                .one(&state.db)
                .await?;
            if submission.is_some() {
                completed += 1;
            }
            else {
                due_dates.push(UpcomingDeadline {
                    milestone: milestone.title.clone(),
                    date:      milestone.due_date.to_string(),
                });
            }
        }

        let progress = if milestones.is_empty() {
            0
        }
        else {
            ((completed as f64 / milestones.len() as f64) * 100.0) as u32
        };

        let current_milestone = due_dates
            .first()
            .map(|d| d.milestone.clone())
            .unwrap_or_else(|| "Not started".to_string());

        let is_completed = project.status == entity::sea_orm_active_enums::ProjectStatus::Completed;

        cards.push(ActiveProjectResponse {
            id: project.id,
            title: project.title,
            professor: display_or_unknown(professor.as_ref()),
            status: project.status.to_string(),
            team_id: team.id,
            team_name: team.name.clone(),
            team_members,
            current_milestone,
            progress,
            due_dates,
            is_completed,
        });
    }

    Ok(Json(cards))
}

/// Resolve a team's members with their user rows; missing users render as
/// "Unknown".
async fn resolve_members<C: ConnectionTrait>(
    conn: &C,
    team: &entity::teams::Model,
) -> Result<Vec<TeamMemberInfo>> {
    let members = TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team.id))
        .find_also_related(Users)
        .all(conn)
        .await?;

    Ok(members
        .into_iter()
        .map(|(member, user)| {
            let (name, email, year) = match user {
                Some(u) => (u.full_name, u.email, u.year),
                None => ("Unknown".to_string(), "unknown".to_string(), None),
            };
            TeamMemberInfo {
                id: member.student_id,
                name,
                email,
                year,
                is_leader: member.student_id == team.leader_id,
            }
        })
        .collect())
}
