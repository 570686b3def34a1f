//! # Join-Request Workflow
//!
//! A student's request to join an existing team, decided by the team leader.
//! `Pending -> {Approved, Rejected}`, both terminal. Approval re-checks team
//! capacity inside the deciding transaction: a request approved against a
//! full team is persisted as rejected and the caller sees `TeamFull`.

use axum::Json;
use entity::{
    sea_orm_active_enums::TeamStatus,
    student_team_applications::{Column as JoinRequestColumn, Entity as StudentTeamApplications},
    teams::{Entity as Teams, MAX_TEAM_SIZE},
    users::Entity as Users,
};
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::info;
use validator::Validate;

use crate::{
    dto::teams::{JoinRequestListResponse, JoinRequestResponse, JoinTeamRequest},
    middleware::auth::Principal,
    teams::{can_manage_team, is_member, member_count},
    users::display_or_unknown,
    AppState,
};

/// Apply to join a team
pub async fn apply_handler(
    state: &AppState,
    principal: Principal,
    team_id: i32,
    req: JoinTeamRequest,
) -> Result<Json<JoinRequestResponse>> {
    principal.require_student()?;
    req.validate()?;

    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if is_member(&state.db, team_id, principal.id).await? {
        return Err(AppError::already_member("Student is already a member of this team"));
    }

    // A rejected request may be retried; an open one may not be duplicated
    let open_request = StudentTeamApplications::find()
        .filter(JoinRequestColumn::TeamId.eq(team_id))
        .filter(JoinRequestColumn::StudentId.eq(principal.id))
        .filter(JoinRequestColumn::Status.ne(TeamStatus::Rejected))
        .one(&state.db)
        .await?;
    if open_request.is_some() {
        return Err(AppError::duplicate_application(
            "Student already applied to this team",
        ));
    }

    if member_count(&state.db, team_id).await? >= MAX_TEAM_SIZE {
        return Err(AppError::team_full("Team is already full"));
    }

    let request = entity::student_team_applications::ActiveModel {
        team_id: Set(team_id),
        student_id: Set(principal.id),
        status: Set(TeamStatus::Pending),
        message: Set(req.message),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(team_id = %team_id, student_id = %principal.id, request_id = %request.id, "Join request created");

    join_request_response(&state.db, request, &team.name).await.map(Json)
}

/// Approve a join request
///
/// Leader-only. Capacity is re-checked in the transaction that inserts the
/// member: when the team filled up between request and approval, the request
/// is persisted as rejected and `TeamFull` surfaces to the caller.
pub async fn approve_handler(
    state: &AppState,
    principal: Principal,
    request_id: i32,
) -> Result<Json<JoinRequestResponse>> {
    let request = StudentTeamApplications::find_by_id(request_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Join request not found"))?;

    let team = Teams::find_by_id(request.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can approve join requests"));
    }

    if request.status.is_terminal() {
        return Err(AppError::invalid_transition(format!(
            "Join request is already {}",
            request.status
        )));
    }

    let txn = state.db.begin().await?;

    if member_count(&txn, team.id).await? >= MAX_TEAM_SIZE {
        // The slot was taken while the request waited; record the outcome
        let mut reject: entity::student_team_applications::ActiveModel = request.into();
        reject.status = Set(TeamStatus::Rejected);
        reject.update(&txn).await?;
        txn.commit().await?;
        return Err(AppError::team_full("Team is already full"));
    }

    if is_member(&txn, team.id, request.student_id).await? {
        txn.rollback().await?;
        return Err(AppError::already_member("Student is already a member of this team"));
    }

    entity::team_members::ActiveModel {
        team_id: Set(team.id),
        student_id: Set(request.student_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut approve: entity::student_team_applications::ActiveModel = request.into();
    approve.status = Set(TeamStatus::Approved);
    let approved = approve.update(&txn).await?;

    txn.commit().await?;

    info!(
        request_id = %approved.id,
        team_id = %team.id,
        student_id = %approved.student_id,
        actor_id = %principal.id,
        "Join request approved"
    );

    join_request_response(&state.db, approved, &team.name).await.map(Json)
}

/// Reject a join request
///
/// Leader-only. Rejecting an already-decided request is an invalid
/// transition.
pub async fn reject_handler(
    state: &AppState,
    principal: Principal,
    request_id: i32,
) -> Result<Json<JoinRequestResponse>> {
    let request = StudentTeamApplications::find_by_id(request_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Join request not found"))?;

    let team = Teams::find_by_id(request.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can reject join requests"));
    }

    if request.status.is_terminal() {
        return Err(AppError::invalid_transition(format!(
            "Join request is already {}",
            request.status
        )));
    }

    let mut reject: entity::student_team_applications::ActiveModel = request.into();
    reject.status = Set(TeamStatus::Rejected);
    let rejected = reject.update(&state.db).await?;

    info!(request_id = %rejected.id, team_id = %team.id, actor_id = %principal.id, "Join request rejected");

    join_request_response(&state.db, rejected, &team.name).await.map(Json)
}

/// List the join requests for a team (leader-only)
pub async fn list_for_team_handler(
    state: &AppState,
    principal: Principal,
    team_id: i32,
) -> Result<Json<JoinRequestListResponse>> {
    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can view join requests"));
    }

    let requests = StudentTeamApplications::find()
        .filter(JoinRequestColumn::TeamId.eq(team_id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        responses.push(join_request_response(&state.db, request, &team.name).await?);
    }

    Ok(Json(JoinRequestListResponse {
        success:  true,
        requests: responses,
    }))
}

/// List the acting student's own join requests
pub async fn my_requests_handler(state: &AppState, principal: Principal) -> Result<Json<JoinRequestListResponse>> {
    principal.require_student()?;

    let requests = StudentTeamApplications::find()
        .filter(JoinRequestColumn::StudentId.eq(principal.id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(requests.len());
    for request in requests {
        let team_name = Teams::find_by_id(request.team_id)
            .one(&state.db)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| "Unknown".to_string());
        responses.push(join_request_response(&state.db, request, &team_name).await?);
    }

    Ok(Json(JoinRequestListResponse {
        success:  true,
        requests: responses,
    }))
}

/// Build the response for a join request, applicant name resolved.
async fn join_request_response<C: ConnectionTrait>(
    conn: &C,
    request: entity::student_team_applications::Model,
    team_name: &str,
) -> Result<JoinRequestResponse> {
    let student = Users::find_by_id(request.student_id).one(conn).await?;

    Ok(JoinRequestResponse {
        id:           request.id,
        team_id:      request.team_id,
        team_name:    team_name.to_string(),
        student_id:   request.student_id,
        student_name: display_or_unknown(student.as_ref()),
        status:       request.status.to_string(),
        message:      request.message,
        created_at:   request.created_at.to_rfc3339(),
    })
}
