//! # Roster Handlers
//!
//! User records without credentials: admins add people to the roster, the
//! identity collaborator authenticates them elsewhere. Students maintain the
//! profile fields the collaboration directory shows.

use axum::Json;
use entity::{
    sea_orm_active_enums::UserRole,
    team_members::{Column as MemberColumn, Entity as TeamMembers},
    users::{Column as UserColumn, Entity as Users},
};
use error::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;
use validator::Validate;

use crate::{
    dto::users::{
        CreateUserRequest,
        StudentDirectoryEntry,
        StudentDirectoryResponse,
        UpdateProfileRequest,
        UserListResponse,
        UserResponse,
    },
    middleware::auth::Principal,
    AppState,
};

/// Resolve a user's display name, tolerating a missing row.
pub(crate) fn display_or_unknown(user: Option<&entity::users::Model>) -> String {
    user.map(|u| u.full_name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Derive up-to-two initials from a full name.
pub(crate) fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .map(|c| c.to_uppercase().to_string())
        .take(2)
        .collect()
}

/// Parse a role string into the enum.
fn parse_role(role: &str) -> Result<UserRole> {
    match role.to_lowercase().as_str() {
        "student" => Ok(UserRole::Student),
        "professor" => Ok(UserRole::Professor),
        "admin" => Ok(UserRole::Admin),
        _ => {
            Err(AppError::validation(
                "Invalid role. Must be one of: student, professor, admin",
            ))
        },
    }
}

/// Add a user to the roster (admin-only)
pub async fn create_user_handler(
    state: &AppState,
    principal: Principal,
    req: CreateUserRequest,
) -> Result<Json<UserResponse>> {
    principal.require_admin()?;
    req.validate()?;

    let role = parse_role(&req.role)?;

    let existing = Users::find()
        .filter(UserColumn::Email.eq(&req.email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("A user with this email already exists"));
    }

    let user = entity::users::ActiveModel {
        email: Set(req.email),
        full_name: Set(req.full_name),
        role: Set(role),
        department: Set(req.department),
        year: Set(req.year),
        skills: Set(None),
        interests: Set(None),
        availability: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(user_id = %user.id, role = %user.role, actor_id = %principal.id, "User created");

    Ok(Json(user_response(user)))
}

/// List all users (professor or admin)
pub async fn list_users_handler(state: &AppState, principal: Principal) -> Result<Json<UserListResponse>> {
    principal.require_professor()?;

    let users = Users::find().all(&state.db).await?;

    Ok(Json(UserListResponse {
        success: true,
        users:   users.into_iter().map(user_response).collect(),
    }))
}

/// The student collaboration directory (any role)
pub async fn student_directory_handler(
    state: &AppState,
    _principal: Principal,
) -> Result<Json<StudentDirectoryResponse>> {
    let students = Users::find()
        .filter(UserColumn::Role.eq(UserRole::Student))
        .all(&state.db)
        .await?;

    let mut entries = Vec::with_capacity(students.len());
    for student in students {
        let memberships = TeamMembers::find()
            .filter(MemberColumn::StudentId.eq(student.id))
            .all(&state.db)
            .await?;

        entries.push(StudentDirectoryEntry {
            id:           student.id,
            initials:     initials(&student.full_name),
            name:         student.full_name,
            year:         student.year.unwrap_or_else(|| "Unknown".to_string()),
            department:   student.department.unwrap_or_else(|| "Unknown".to_string()),
            skills:       student.skills,
            interests:    student.interests,
            availability: student.availability,
            teams:        memberships.into_iter().map(|m| m.team_id).collect(),
        });
    }

    Ok(Json(StudentDirectoryResponse {
        success:  true,
        students: entries,
    }))
}

/// Update the acting student's own profile
pub async fn update_profile_handler(
    state: &AppState,
    principal: Principal,
    req: UpdateProfileRequest,
) -> Result<Json<UserResponse>> {
    principal.require_student()?;
    req.validate()?;

    let user = Users::find_by_id(principal.id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Student not found"))?;

    let mut active_model: entity::users::ActiveModel = user.into();
    if let Some(skills) = req.skills {
        active_model.skills = Set(Some(skills));
    }
    if let Some(interests) = req.interests {
        active_model.interests = Set(Some(interests));
    }
    if let Some(availability) = req.availability {
        active_model.availability = Set(Some(availability));
    }

    let updated = active_model.update(&state.db).await?;

    info!(user_id = %principal.id, "Student profile updated");

    Ok(Json(user_response(updated)))
}

/// Build the response for a user.
fn user_response(user: entity::users::Model) -> UserResponse {
    UserResponse {
        id:         user.id,
        email:      user.email,
        full_name:  user.full_name,
        role:       user.role.to_string(),
        department: user.department,
        year:       user.year,
        created_at: user.created_at.to_rfc3339(),
    }
}
