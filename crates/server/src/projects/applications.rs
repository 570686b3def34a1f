//! # Project-Application Workflow
//!
//! A team's bid for a project. Applying reserves the team's `project_id`
//! pessimistically; approval is first-writer-wins under the
//! one-approved-team-per-project guard, re-checked inside the deciding
//! transaction and backstopped by the store's partial unique index. Every
//! sibling application is rejected in the same transaction that approves
//! the winner, so no partial arbitration state ever commits.

use axum::Json;
use entity::{
    projects::Entity as Projects,
    sea_orm_active_enums::TeamStatus,
    team_applications::{Column as ApplicationColumn, Entity as TeamApplications},
    teams::{Column as TeamColumn, Entity as Teams},
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    ModelTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::projects::{
        ApplyTeamRequest,
        SuccessResponse,
        TeamApplicationListResponse,
        TeamApplicationResponse,
        UpdateTeamStatusRequest,
    },
    middleware::auth::Principal,
    projects::can_manage_project,
    teams::can_manage_team,
    AppState,
};

/// Apply a team to a project
///
/// Leader-only. In the same transaction that records the application the
/// team's `project_id` is set and its status reset to pending, reserving
/// the slot until the professor decides.
pub async fn apply_handler(
    state: &AppState,
    principal: Principal,
    req: ApplyTeamRequest,
) -> Result<Json<TeamApplicationResponse>> {
    principal.require_student()?;
    req.validate()?;

    let project = Projects::find_by_id(req.project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    let team = Teams::find_by_id(req.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can apply to projects"));
    }

    if team.project_id.is_some() {
        return Err(AppError::already_assigned("Team is already assigned to a project"));
    }

    let existing = TeamApplications::find()
        .filter(ApplicationColumn::ProjectId.eq(req.project_id))
        .filter(ApplicationColumn::TeamId.eq(req.team_id))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::duplicate_application("Team already applied to this project"));
    }

    let txn = state.db.begin().await?;

    let application = entity::team_applications::ActiveModel {
        project_id: Set(req.project_id),
        team_id: Set(req.team_id),
        status: Set(TeamStatus::Pending),
        motivation: Set(req.motivation),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut reserve: entity::teams::ActiveModel = team.into();
    reserve.project_id = Set(Some(req.project_id));
    reserve.status = Set(TeamStatus::Pending);
    reserve.update(&txn).await?;

    txn.commit().await?;

    info!(
        application_id = %application.id,
        team_id = %req.team_id,
        project_id = %req.project_id,
        actor_id = %principal.id,
        "Team applied to project"
    );

    application_response(&state.db, application, Some(&project.title)).await.map(Json)
}

/// Approve a team application
///
/// Owner-only. The first approval that observes no approved team for the
/// project wins; the guard is re-checked in the transaction and every
/// sibling application is rejected before commit.
pub async fn approve_handler(
    state: &AppState,
    principal: Principal,
    application_id: i32,
) -> Result<Json<TeamApplicationResponse>> {
    principal.require_professor()?;

    let application = TeamApplications::find_by_id(application_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;

    let project = Projects::find_by_id(application.project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can approve applications"));
    }

    if application.status.is_terminal() {
        return Err(AppError::invalid_transition(format!(
            "Application is already {}",
            application.status
        )));
    }

    let txn = state.db.begin().await?;

    // First-writer-wins: a concurrent approval that committed before this
    // transaction makes the check fail here; the partial unique index on
    // approved teams catches the remaining write race.
    let existing_approved = Teams::find()
        .filter(TeamColumn::ProjectId.eq(project.id))
        .filter(TeamColumn::Status.eq(TeamStatus::Approved))
        .filter(TeamColumn::Id.ne(application.team_id))
        .one(&txn)
        .await?;
    if existing_approved.is_some() {
        txn.rollback().await?;
        return Err(AppError::already_assigned("Project already has an approved team"));
    }

    let team = Teams::find_by_id(application.team_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    let mut approve_team: entity::teams::ActiveModel = team.into();
    approve_team.project_id = Set(Some(project.id));
    approve_team.status = Set(TeamStatus::Approved);
    approve_team.update(&txn).await?;

    let team_id = application.team_id;
    let mut approve_app: entity::team_applications::ActiveModel = application.into();
    approve_app.status = Set(TeamStatus::Approved);
    let approved = approve_app.update(&txn).await?;

    // Single-winner arbitration: no sibling is left pending
    let siblings = TeamApplications::find()
        .filter(ApplicationColumn::ProjectId.eq(project.id))
        .filter(ApplicationColumn::Id.ne(approved.id))
        .all(&txn)
        .await?;
    for sibling in siblings {
        let sibling_team_id = sibling.team_id;
        let mut reject: entity::team_applications::ActiveModel = sibling.into();
        reject.status = Set(TeamStatus::Rejected);
        reject.update(&txn).await?;

        // A losing team gets its reservation back
        if let Some(sibling_team) = Teams::find_by_id(sibling_team_id).one(&txn).await? {
            if sibling_team.project_id == Some(project.id) {
                let mut release: entity::teams::ActiveModel = sibling_team.into();
                release.project_id = Set(None);
                release.status = Set(TeamStatus::Rejected);
                release.update(&txn).await?;
            }
        }
    }

    txn.commit().await?;

    info!(
        application_id = %approved.id,
        team_id = %team_id,
        project_id = %project.id,
        actor_id = %principal.id,
        "Team application approved"
    );

    application_response(&state.db, approved, Some(&project.title)).await.map(Json)
}

/// Withdraw a team application
///
/// Leader-only; the record is deleted rather than transitioned. A pending
/// withdrawal releases the team's reservation of the project.
pub async fn withdraw_handler(
    state: &AppState,
    principal: Principal,
    application_id: i32,
) -> Result<Json<SuccessResponse>> {
    let application = TeamApplications::find_by_id(application_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;

    let team = Teams::find_by_id(application.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can withdraw an application"));
    }

    let txn = state.db.begin().await?;

    let was_pending = application.status == TeamStatus::Pending;
    let project_id = application.project_id;
    let application_id = application.id;

    application.delete(&txn).await?;

    if was_pending && team.project_id == Some(project_id) {
        let mut release: entity::teams::ActiveModel = team.into();
        release.project_id = Set(None);
        release.status = Set(TeamStatus::Pending);
        release.update(&txn).await?;
    }

    txn.commit().await?;

    info!(application_id = %application_id, actor_id = %principal.id, "Team application withdrawn");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Application withdrawn successfully".to_string(),
    }))
}

/// Set a team's status directly, bypassing the application object
///
/// Owner-only. Approval is guarded against an existing approved team;
/// rejection clears the team's project reservation. The matching
/// application, when one exists, mirrors the new status.
pub async fn update_team_status_handler(
    state: &AppState,
    principal: Principal,
    team_id: i32,
    req: UpdateTeamStatusRequest,
) -> Result<Json<SuccessResponse>> {
    principal.require_professor()?;
    req.validate()?;

    let status = match req.status.to_lowercase().as_str() {
        "pending" => TeamStatus::Pending,
        "approved" => TeamStatus::Approved,
        "rejected" => TeamStatus::Rejected,
        _ => {
            return Err(AppError::validation(
                "Invalid status. Must be one of: pending, approved, rejected",
            ));
        },
    };

    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    let project_id = team
        .project_id
        .ok_or_else(|| AppError::validation("Team is not associated with any project"))?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can update team status"));
    }

    let txn = state.db.begin().await?;

    if status == TeamStatus::Approved {
        let existing_approved = Teams::find()
            .filter(TeamColumn::ProjectId.eq(project.id))
            .filter(TeamColumn::Status.eq(TeamStatus::Approved))
            .filter(TeamColumn::Id.ne(team.id))
            .one(&txn)
            .await?;
        if existing_approved.is_some() {
            txn.rollback().await?;
            return Err(AppError::already_assigned("Project already has an approved team"));
        }
    }

    let mut update: entity::teams::ActiveModel = team.into();
    update.status = Set(status.clone());
    if status == TeamStatus::Rejected {
        // A rejected team is free to apply elsewhere
        update.project_id = Set(None);
    }
    update.update(&txn).await?;

    // Mirror the decision onto the matching application
    let application = TeamApplications::find()
        .filter(ApplicationColumn::TeamId.eq(team_id))
        .filter(ApplicationColumn::ProjectId.eq(project.id))
        .one(&txn)
        .await?;
    if let Some(application) = application {
        let mut mirror: entity::team_applications::ActiveModel = application.into();
        mirror.status = Set(status.clone());
        mirror.update(&txn).await?;
    }

    txn.commit().await?;

    info!(team_id = %team_id, project_id = %project.id, status = %status, actor_id = %principal.id, "Team status updated");

    Ok(Json(SuccessResponse {
        success: true,
        message: format!("Team status updated to {}", status),
    }))
}

/// List the applications for a project (owner-only)
pub async fn list_for_project_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
) -> Result<Json<TeamApplicationListResponse>> {
    principal.require_professor()?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can view its applications"));
    }

    let applications = TeamApplications::find()
        .filter(ApplicationColumn::ProjectId.eq(project_id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(applications.len());
    for application in applications {
        responses.push(application_response(&state.db, application, Some(&project.title)).await?);
    }

    Ok(Json(TeamApplicationListResponse {
        success:      true,
        applications: responses,
    }))
}

/// List the applications made by the acting student's teams
pub async fn my_applications_handler(
    state: &AppState,
    principal: Principal,
) -> Result<Json<TeamApplicationListResponse>> {
    principal.require_student()?;

    let memberships = entity::team_members::Entity::find()
        .filter(entity::team_members::Column::StudentId.eq(principal.id))
        .all(&state.db)
        .await?;
    let team_ids: Vec<i32> = memberships.iter().map(|m| m.team_id).collect();

    if team_ids.is_empty() {
        return Ok(Json(TeamApplicationListResponse {
            success:      true,
            applications: vec![],
        }));
    }

    let applications = TeamApplications::find()
        .filter(ApplicationColumn::TeamId.is_in(team_ids))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(applications.len());
    for application in applications {
        responses.push(application_response(&state.db, application, None).await?);
    }

    Ok(Json(TeamApplicationListResponse {
        success:      true,
        applications: responses,
    }))
}

/// Build the response for an application, names resolved.
async fn application_response<C: ConnectionTrait>(
    conn: &C,
    application: entity::team_applications::Model,
    project_title: Option<&str>,
) -> Result<TeamApplicationResponse> {
    let project_title = match project_title {
        Some(title) => title.to_string(),
        None => {
            Projects::find_by_id(application.project_id)
                .one(conn)
                .await?
                .map(|p| p.title)
                .unwrap_or_else(|| "Unknown".to_string())
        },
    };

    let team_name = Teams::find_by_id(application.team_id)
        .one(conn)
        .await?
        .map(|t| t.name)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(TeamApplicationResponse {
        id: application.id,
        project_id: application.project_id,
        project_title,
        team_id: application.team_id,
        team_name,
        status: application.status.to_string(),
        motivation: application.motivation,
        created_at: application.created_at.to_rfc3339(),
    })
}
