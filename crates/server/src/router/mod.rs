//! # API Router Configuration
//!
//! Configures API routes for the Capstone application. The wrappers here are
//! the only place that touches axum extractors; workflow handlers receive
//! typed input built at this boundary.

use axum::{
    extract::{Extension, Multipart, Path, Query, State as AxumState},
    middleware,
    response::Response,
    routing::{delete, get, post, put},
    Json,
    Router,
};
use error::{AppError, Result};
use serde::Deserialize;

use crate::{
    dto::{
        milestones::{
            GradeMilestoneRequest,
            GradeSubmissionRequest,
            SubmitMilestoneRequest,
            UploadedFile,
        },
        projects::{ApplyTeamRequest, CreateProjectRequest, UpdateProjectRequest, UpdateProjectStatusRequest, UpdateTeamStatusRequest},
        teams::{AddMemberRequest, CreateTeamRequest, JoinTeamRequest},
        users::{CreateUserRequest, UpdateProfileRequest},
    },
    middleware::auth::Principal,
    AppState,
};

/// Creates the API router with all routes
///
/// # Arguments
///
/// * `state` - Application state containing DB pool and config
///
/// # Returns
///
/// Configured Axum router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Roster
        .route("/api/v1/users", post(create_user_handler).get(list_users_handler))
        .route("/api/v1/students", get(student_directory_handler))
        .route("/api/v1/students/me/profile", put(update_profile_handler))
        // Team registry
        .route("/api/v1/teams", post(create_team_handler).get(list_teams_handler))
        .route("/api/v1/teams/mine", get(my_teams_handler))
        .route("/api/v1/teams/:id", get(get_team_handler))
        .route("/api/v1/teams/:id/members", post(add_member_handler))
        .route("/api/v1/teams/:id/status", put(update_team_status_handler))
        .route("/api/v1/teams/:id/milestones", get(team_milestones_handler))
        // Join-request workflow
        .route(
            "/api/v1/teams/:id/join-requests",
            post(join_team_handler).get(list_join_requests_handler),
        )
        .route("/api/v1/join-requests/mine", get(my_join_requests_handler))
        .route("/api/v1/join-requests/:id/approve", post(approve_join_request_handler))
        .route("/api/v1/join-requests/:id/reject", post(reject_join_request_handler))
        // Projects
        .route("/api/v1/projects", post(create_project_handler).get(list_projects_handler))
        .route("/api/v1/projects/available", get(available_projects_handler))
        .route("/api/v1/projects/active", get(active_projects_handler))
        .route(
            "/api/v1/projects/:id",
            get(get_project_handler)
                .put(update_project_handler)
                .delete(delete_project_handler),
        )
        .route("/api/v1/projects/:id/status", put(update_project_status_handler))
        .route("/api/v1/projects/:id/detailed", get(detailed_project_handler))
        .route("/api/v1/projects/:id/resources", post(upload_resource_handler))
        .route(
            "/api/v1/projects/:id/resources/:resource_id",
            get(download_resource_handler),
        )
        .route("/api/v1/projects/:id/milestones", post(add_milestone_handler))
        .route("/api/v1/projects/:id/applications", get(list_project_applications_handler))
        // Project-application workflow
        .route("/api/v1/applications", post(apply_team_handler))
        .route("/api/v1/applications/mine", get(my_applications_handler))
        .route("/api/v1/applications/:id/approve", post(approve_application_handler))
        .route("/api/v1/applications/:id", delete(withdraw_application_handler))
        // Milestone lifecycle
        .route("/api/v1/milestones/:id/submit", post(submit_milestone_handler))
        .route("/api/v1/milestones/:id/grade", post(grade_milestone_handler))
        .route("/api/v1/submissions", get(list_submissions_handler))
        .route("/api/v1/submissions/:id/grade", post(grade_submission_handler))
        .layer(middleware::from_fn(crate::middleware::auth::auth_middleware))
        .layer(Extension(state.clone()))
        .with_state(state)
}

/// Creates the health check router
pub fn create_health_router() -> Router { Router::new().route("/health", get(|| async { "OK" })) }

/// Creates the main application router
///
/// # Arguments
///
/// * `state` - Application state containing DB pool and config
///
/// # Returns
///
/// Main router with health checks and API routes
pub fn create_app_router(state: AppState) -> Router {
    Router::new()
        .merge(create_health_router())
        .merge(create_router(state))
}

// Roster wrappers

async fn create_user_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<crate::dto::users::UserResponse>> {
    crate::users::create_user_handler(&state, principal, req).await
}

async fn list_users_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::users::UserListResponse>> {
    crate::users::list_users_handler(&state, principal).await
}

async fn student_directory_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::users::StudentDirectoryResponse>> {
    crate::users::student_directory_handler(&state, principal).await
}

async fn update_profile_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<crate::dto::users::UserResponse>> {
    crate::users::update_profile_handler(&state, principal, req).await
}

// Team registry wrappers

async fn create_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<Json<crate::dto::teams::TeamDetailResponse>> {
    crate::teams::create_team_handler(&state, principal, req).await
}

async fn list_teams_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::teams::TeamListResponse>> {
    crate::teams::list_teams_handler(&state, principal).await
}

async fn my_teams_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::teams::TeamListResponse>> {
    crate::teams::my_teams_handler(&state, principal).await
}

async fn get_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
) -> Result<Json<crate::dto::teams::TeamDetailResponse>> {
    crate::teams::get_team_handler(&state, principal, team_id).await
}

async fn add_member_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<crate::dto::teams::TeamDetailResponse>> {
    crate::teams::add_member_handler(&state, principal, team_id, req).await
}

async fn update_team_status_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
    Json(req): Json<UpdateTeamStatusRequest>,
) -> Result<Json<crate::dto::projects::SuccessResponse>> {
    crate::projects::applications::update_team_status_handler(&state, principal, team_id, req).await
}

async fn team_milestones_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
) -> Result<Json<Vec<crate::dto::milestones::TeamMilestoneResponse>>> {
    crate::projects::milestones::team_milestones_handler(&state, principal, team_id).await
}

// Join-request wrappers

async fn join_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
    Json(req): Json<JoinTeamRequest>,
) -> Result<Json<crate::dto::teams::JoinRequestResponse>> {
    crate::teams::join_requests::apply_handler(&state, principal, team_id, req).await
}

async fn list_join_requests_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(team_id): Path<i32>,
) -> Result<Json<crate::dto::teams::JoinRequestListResponse>> {
    crate::teams::join_requests::list_for_team_handler(&state, principal, team_id).await
}

async fn my_join_requests_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::teams::JoinRequestListResponse>> {
    crate::teams::join_requests::my_requests_handler(&state, principal).await
}

async fn approve_join_request_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(request_id): Path<i32>,
) -> Result<Json<crate::dto::teams::JoinRequestResponse>> {
    crate::teams::join_requests::approve_handler(&state, principal, request_id).await
}

async fn reject_join_request_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(request_id): Path<i32>,
) -> Result<Json<crate::dto::teams::JoinRequestResponse>> {
    crate::teams::join_requests::reject_handler(&state, principal, request_id).await
}

// Project wrappers

async fn create_project_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<crate::dto::projects::ProjectResponse>> {
    crate::projects::create_project_handler(&state, principal, req).await
}

async fn list_projects_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::projects::ProjectListResponse>> {
    crate::projects::list_projects_handler(&state, principal).await
}

async fn available_projects_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<crate::dto::projects::AvailableProjectResponse>>> {
    crate::projects::available_projects_handler(&state, principal).await
}

async fn active_projects_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<crate::projects::aggregation::ActiveProjectResponse>>> {
    crate::projects::aggregation::active_projects_handler(&state, principal).await
}

async fn get_project_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
) -> Result<Json<crate::dto::projects::ProjectResponse>> {
    crate::projects::get_project_handler(&state, principal, project_id).await
}

async fn update_project_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<crate::dto::projects::ProjectResponse>> {
    crate::projects::update_project_handler(&state, principal, project_id, req).await
}

async fn update_project_status_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
    Json(req): Json<UpdateProjectStatusRequest>,
) -> Result<Json<crate::dto::projects::ProjectResponse>> {
    crate::projects::update_status_handler(&state, principal, project_id, req).await
}

async fn delete_project_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
) -> Result<Json<crate::dto::projects::SuccessResponse>> {
    crate::projects::delete_project_handler(&state, principal, project_id).await
}

async fn detailed_project_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
) -> Result<Json<crate::projects::aggregation::DetailedProjectResponse>> {
    crate::projects::aggregation::detailed_project_handler(&state, principal, project_id).await
}

async fn upload_resource_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<crate::dto::projects::ResourceResponse>> {
    let (filename, content) = parse_file_multipart(multipart).await?;
    crate::projects::upload_resource_handler(&state, principal, project_id, filename, content).await
}

async fn download_resource_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path((project_id, resource_id)): Path<(i32, i32)>,
) -> Result<Response> {
    crate::projects::download_resource_handler(&state, principal, project_id, resource_id).await
}

async fn list_project_applications_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
) -> Result<Json<crate::dto::projects::TeamApplicationListResponse>> {
    crate::projects::applications::list_for_project_handler(&state, principal, project_id).await
}

// Application wrappers

async fn apply_team_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ApplyTeamRequest>,
) -> Result<Json<crate::dto::projects::TeamApplicationResponse>> {
    crate::projects::applications::apply_handler(&state, principal, req).await
}

async fn my_applications_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<crate::dto::projects::TeamApplicationListResponse>> {
    crate::projects::applications::my_applications_handler(&state, principal).await
}

async fn approve_application_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(application_id): Path<i32>,
) -> Result<Json<crate::dto::projects::TeamApplicationResponse>> {
    crate::projects::applications::approve_handler(&state, principal, application_id).await
}

async fn withdraw_application_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(application_id): Path<i32>,
) -> Result<Json<crate::dto::projects::SuccessResponse>> {
    crate::projects::applications::withdraw_handler(&state, principal, application_id).await
}

// Milestone wrappers

async fn add_milestone_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(project_id): Path<i32>,
    Json(req): Json<crate::dto::milestones::CreateMilestoneRequest>,
) -> Result<Json<crate::dto::milestones::MilestoneResponse>> {
    crate::projects::milestones::add_milestone_handler(&state, principal, project_id, req).await
}

async fn submit_milestone_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(milestone_id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<crate::dto::milestones::SubmissionResponse>> {
    let req = parse_submit_multipart(multipart).await?;
    crate::projects::milestones::submit_handler(&state, principal, milestone_id, req).await
}

async fn grade_milestone_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(milestone_id): Path<i32>,
    Json(req): Json<GradeMilestoneRequest>,
) -> Result<Json<crate::dto::milestones::SubmissionResponse>> {
    crate::projects::milestones::grade_milestone_handler(&state, principal, milestone_id, req).await
}

async fn grade_submission_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Path(submission_id): Path<i32>,
    Json(req): Json<GradeSubmissionRequest>,
) -> Result<Json<crate::dto::milestones::SubmissionResponse>> {
    crate::projects::milestones::grade_submission_handler(&state, principal, submission_id, req).await
}

/// Query parameters for the submissions listing
#[derive(Debug, Deserialize)]
struct SubmissionListQuery {
    project_id: Option<i32>,
}

async fn list_submissions_handler(
    AxumState(state): AxumState<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<crate::dto::milestones::SubmissionListResponse>> {
    crate::projects::milestones::list_submissions_handler(&state, principal, query.project_id).await
}

/// Read a single file out of a multipart body (field name `file`).
async fn parse_file_multipart(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart request: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("file").to_string();
            let content = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read uploaded file: {}", e)))?;
            return Ok((filename, content.to_vec()));
        }
    }

    Err(AppError::validation("Multipart field 'file' is required"))
}

/// Build a typed submission request from a multipart body.
///
/// Fields: `team_id` (required), `text`, repeated `links`, repeated `files`.
async fn parse_submit_multipart(mut multipart: Multipart) -> Result<SubmitMilestoneRequest> {
    let mut team_id: Option<i32> = None;
    let mut text: Option<String> = None;
    let mut links: Vec<String> = Vec::new();
    let mut files: Vec<UploadedFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed multipart request: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "team_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read team_id: {}", e)))?;
                team_id = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| AppError::validation("team_id must be an integer"))?,
                );
            },
            "text" => {
                text = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Failed to read text: {}", e)))?,
                );
            },
            "links" => {
                let link = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read link: {}", e)))?;
                if !link.trim().is_empty() {
                    links.push(link.trim().to_string());
                }
            },
            "files" => {
                let filename = field.file_name().unwrap_or("file").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Failed to read uploaded file: {}", e)))?;
                files.push(UploadedFile {
                    filename,
                    content: content.to_vec(),
                });
            },
            _ => {},
        }
    }

    Ok(SubmitMilestoneRequest {
        team_id: team_id.ok_or_else(|| AppError::validation("Multipart field 'team_id' is required"))?,
        text,
        links,
        files,
    })
}
