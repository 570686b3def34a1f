//! # Team Registry
//!
//! Team creation and membership. A team holds one to four members, the
//! leader always among them; membership mutations re-validate the capacity
//! invariant inside the transaction that writes, so concurrent joins cannot
//! push a team past the cap.

pub mod join_requests;

use entity::{
    sea_orm_active_enums::{TeamStatus, UserRole},
    team_members::{Column as MemberColumn, Entity as TeamMembers},
    teams::{Column as TeamColumn, Entity as Teams, MAX_TEAM_SIZE},
    users::{Column as UserColumn, Entity as Users},
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use axum::Json;
use tracing::info;
use validator::Validate;

use crate::{
    dto::teams::{
        AddMemberRequest,
        CreateTeamRequest,
        TeamDetailResponse,
        TeamListResponse,
        TeamMemberInfo,
        TeamResponse,
    },
    users::display_or_unknown,
    AppState,
    middleware::auth::Principal,
};

/// Check whether a principal may act for a team (its leader, or an admin).
pub fn can_manage_team(principal: &Principal, team: &entity::teams::Model) -> bool {
    principal.is_admin() || team.leader_id == principal.id
}

/// Compute the founding roster of a new team: the leader plus the requested
/// members, leader included implicitly.
///
/// Fails `DuplicateMember` on repeated member IDs and `CapacityExceeded`
/// when the roster would exceed the team cap.
fn founding_roster(leader_id: i32, member_ids: &[i32]) -> Result<Vec<i32>> {
    let mut roster = vec![leader_id];
    for &id in member_ids {
        if id == leader_id {
            // The leader is a member whether or not they are listed
            continue;
        }
        if roster.contains(&id) {
            return Err(AppError::duplicate_member(format!(
                "Student {} is listed more than once",
                id
            )));
        }
        roster.push(id);
    }

    if roster.len() as u64 > MAX_TEAM_SIZE {
        return Err(AppError::capacity_exceeded(format!(
            "A team cannot have more than {} members",
            MAX_TEAM_SIZE
        )));
    }

    Ok(roster)
}

/// Number of members currently on a team.
pub async fn member_count<C: ConnectionTrait>(conn: &C, team_id: i32) -> Result<u64> {
    Ok(TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team_id))
        .count(conn)
        .await?)
}

/// Whether a student is a member of a team.
pub async fn is_member<C: ConnectionTrait>(conn: &C, team_id: i32, student_id: i32) -> Result<bool> {
    Ok(TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team_id))
        .filter(MemberColumn::StudentId.eq(student_id))
        .one(conn)
        .await?
        .is_some())
}

/// Create a new team
///
/// The acting student becomes the leader and first member.
pub async fn create_team_handler(
    state: &AppState,
    principal: Principal,
    req: CreateTeamRequest,
) -> Result<Json<TeamDetailResponse>> {
    principal.require_student()?;
    req.validate()?;

    let roster = founding_roster(principal.id, &req.member_ids)?;

    // Every founding member must be a registered student
    for &student_id in &roster {
        let user = Users::find_by_id(student_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {} not found", student_id)))?;
        if user.role != UserRole::Student {
            return Err(AppError::validation(format!(
                "User {} is not a student",
                student_id
            )));
        }
    }

    let txn = state.db.begin().await?;

    let team = entity::teams::ActiveModel {
        name: Set(req.name.clone()),
        project_id: Set(None),
        leader_id: Set(principal.id),
        is_locked: Set(false),
        status: Set(TeamStatus::Pending),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for &student_id in &roster {
        entity::team_members::ActiveModel {
            team_id: Set(team.id),
            student_id: Set(student_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(team_id = %team.id, leader_id = %principal.id, members = roster.len(), "Team created");

    team_detail_response(&state.db, team).await.map(Json)
}

/// Add a member to a team
///
/// Leader-only. The member count is re-checked inside the transaction that
/// inserts the membership edge.
pub async fn add_member_handler(
    state: &AppState,
    principal: Principal,
    team_id: i32,
    req: AddMemberRequest,
) -> Result<Json<TeamDetailResponse>> {
    req.validate()?;

    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !can_manage_team(&principal, &team) {
        return Err(AppError::not_leader("Only the team leader can add members"));
    }

    if team.is_locked {
        return Err(AppError::team_locked("Team is locked"));
    }

    let user = Users::find_by_id(req.student_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;
    if user.role != UserRole::Student {
        return Err(AppError::validation("Only students can join teams"));
    }

    let txn = state.db.begin().await?;

    if is_member(&txn, team_id, req.student_id).await? {
        txn.rollback().await?;
        return Err(AppError::already_member("Student is already a member of this team"));
    }

    if member_count(&txn, team_id).await? >= MAX_TEAM_SIZE {
        txn.rollback().await?;
        return Err(AppError::team_full("Team is already full"));
    }

    entity::team_members::ActiveModel {
        team_id: Set(team_id),
        student_id: Set(req.student_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(team_id = %team_id, student_id = %req.student_id, actor_id = %principal.id, "Team member added");

    team_detail_response(&state.db, team).await.map(Json)
}

/// List all teams
pub async fn list_teams_handler(state: &AppState, _principal: Principal) -> Result<Json<TeamListResponse>> {
    let teams = Teams::find().all(&state.db).await?;

    let mut responses = Vec::with_capacity(teams.len());
    for team in teams {
        responses.push(team_response(&state.db, &team).await?);
    }

    Ok(Json(TeamListResponse {
        success: true,
        teams:   responses,
    }))
}

/// Get a single team with resolved members
pub async fn get_team_handler(
    state: &AppState,
    _principal: Principal,
    team_id: i32,
) -> Result<Json<TeamDetailResponse>> {
    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    team_detail_response(&state.db, team).await.map(Json)
}

/// List the teams the acting student belongs to
pub async fn my_teams_handler(state: &AppState, principal: Principal) -> Result<Json<TeamListResponse>> {
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

    let mut responses = Vec::with_capacity(teams.len());
    for team in teams {
        responses.push(team_response(&state.db, &team).await?);
    }

    Ok(Json(TeamListResponse {
        success: true,
        teams:   responses,
    }))
}

/// Build the summary response for a team.
pub(crate) async fn team_response<C: ConnectionTrait>(
    conn: &C,
    team: &entity::teams::Model,
) -> Result<TeamResponse> {
    let count = member_count(conn, team.id).await?;

    let leader = Users::find_by_id(team.leader_id).one(conn).await?;

    let mut project_titles = Vec::new();
    if let Some(project_id) = team.project_id {
        if let Some(project) = entity::projects::Entity::find_by_id(project_id)
            .one(conn)
            .await?
        {
            project_titles.push(project.title);
        }
    }

    Ok(TeamResponse {
        id: team.id,
        name: team.name.clone(),
        member_count: count,
        max_members: MAX_TEAM_SIZE,
        project_titles,
        is_open: count < MAX_TEAM_SIZE && !team.is_locked,
        leader_id: team.leader_id,
        leader_name: display_or_unknown(leader.as_ref()),
        status: team.status.to_string(),
    })
}

/// Build the detailed response for a team, members resolved.
pub(crate) async fn team_detail_response<C: ConnectionTrait>(
    conn: &C,
    team: entity::teams::Model,
) -> Result<TeamDetailResponse> {
    let members = TeamMembers::find()
        .filter(MemberColumn::TeamId.eq(team.id))
        .find_also_related(Users)
        .all(conn)
        .await?;

    let member_infos: Vec<TeamMemberInfo> = members
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
        .collect();

    let summary = team_response(conn, &team).await?;

    Ok(TeamDetailResponse {
        team:    summary,
        members: member_infos,
    })
}
