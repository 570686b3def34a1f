//! # Project Handlers
//!
//! Project publication and maintenance by professors, the student-facing
//! catalogue, resource files, and the explicit ordered cascade delete.

pub mod aggregation;
pub mod applications;
pub mod milestones;

use axum::{body::Body, http::header, response::Response, Json};
use entity::{
    milestone_submissions::{Column as SubmissionColumn, Entity as MilestoneSubmissions},
    milestones::{Column as MilestoneColumn, Entity as Milestones},
    project_resources::{Column as ResourceColumn, Entity as ProjectResources},
    projects::{Column as ProjectColumn, Entity as Projects},
    sea_orm_active_enums::{ProjectStatus, TeamStatus},
    submission_documents::{Column as DocumentColumn, Entity as SubmissionDocuments},
    team_applications::{Column as ApplicationColumn, Entity as TeamApplications},
    team_members::{Column as MemberColumn, Entity as TeamMembers},
    teams::{Column as TeamColumn, Entity as Teams},
    users::Entity as Users,
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    ModelTrait,
    PaginatorTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::projects::{
        AvailableProjectResponse,
        CreateProjectRequest,
        ProjectListResponse,
        ProjectResponse,
        ResourceResponse,
        SuccessResponse,
        UpdateProjectRequest,
        UpdateProjectStatusRequest,
    },
    middleware::auth::Principal,
    projects::milestones::{parse_due_date, validate_weightage},
    users::display_or_unknown,
    AppState,
};

/// Check whether a principal may act for a project (its professor, or an
/// admin).
pub fn can_manage_project(principal: &Principal, project: &entity::projects::Model) -> bool {
    principal.is_admin() || project.professor_id == principal.id
}

/// Parse a project status string into the enum.
fn parse_project_status(status: &str) -> Result<ProjectStatus> {
    match status.to_lowercase().as_str() {
        "open" => Ok(ProjectStatus::Open),
        "in_progress" => Ok(ProjectStatus::InProgress),
        "completed" => Ok(ProjectStatus::Completed),
        "cancelled" => Ok(ProjectStatus::Cancelled),
        _ => {
            Err(AppError::validation(
                "Invalid status. Must be one of: open, in_progress, completed, cancelled",
            ))
        },
    }
}

/// Create a new project with its initial milestones
pub async fn create_project_handler(
    state: &AppState,
    principal: Principal,
    req: CreateProjectRequest,
) -> Result<Json<ProjectResponse>> {
    principal.require_professor()?;
    req.validate()?;

    // Parse milestone inputs before anything is written
    let mut parsed_milestones = Vec::with_capacity(req.milestones.len());
    for input in &req.milestones {
        validate_weightage(input.weightage)?;
        let due = parse_due_date(&input.due_date)?;
        parsed_milestones.push((input, due));
    }

    let tags = req
        .tags
        .as_ref()
        .map(|t| serde_json::to_value(t))
        .transpose()
        .map_err(|e| AppError::internal(format!("Failed to encode tags: {}", e)))?;

    let txn = state.db.begin().await?;

    let project = entity::projects::ActiveModel {
        title: Set(req.title.clone()),
        description: Set(req.description.clone()),
        year: Set(req.year.clone()),
        tags: Set(tags),
        status: Set(ProjectStatus::Open),
        professor_id: Set(principal.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (input, due) in parsed_milestones {
        entity::milestones::ActiveModel {
            project_id: Set(project.id),
            title: Set(input.title.clone()),
            description: Set(input.description.clone()),
            due_date: Set(due),
            weightage: Set(input.weightage),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(project_id = %project.id, professor_id = %principal.id, "Project created");

    project_response(&state.db, project).await.map(Json)
}

/// List the acting professor's projects
pub async fn list_projects_handler(state: &AppState, principal: Principal) -> Result<Json<ProjectListResponse>> {
    principal.require_professor()?;

    let projects = Projects::find()
        .filter(ProjectColumn::ProfessorId.eq(principal.id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        responses.push(project_response(&state.db, project).await?);
    }

    Ok(Json(ProjectListResponse {
        success:  true,
        projects: responses,
    }))
}

/// Get a single project
pub async fn get_project_handler(
    state: &AppState,
    _principal: Principal,
    project_id: i32,
) -> Result<Json<ProjectResponse>> {
    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    project_response(&state.db, project).await.map(Json)
}

/// List projects a student can currently apply to
///
/// Open and in-progress projects, flagged with whether one of the student's
/// teams already applied and whether the derived deadline has passed.
pub async fn available_projects_handler(
    state: &AppState,
    principal: Principal,
) -> Result<Json<Vec<AvailableProjectResponse>>> {
    principal.require_student()?;

    let projects = Projects::find()
        .filter(ProjectColumn::Status.is_in([ProjectStatus::Open, ProjectStatus::InProgress]))
        .all(&state.db)
        .await?;

    let memberships = TeamMembers::find()
        .filter(MemberColumn::StudentId.eq(principal.id))
        .all(&state.db)
        .await?;
    let team_ids: Vec<i32> = memberships.iter().map(|m| m.team_id).collect();

    let today = chrono::Utc::now().date_naive();

    let mut responses = Vec::with_capacity(projects.len());
    for project in projects {
        let has_applied = if team_ids.is_empty() {
            false
        }
        else {
            TeamApplications::find()
                .filter(ApplicationColumn::ProjectId.eq(project.id))
                .filter(ApplicationColumn::TeamId.is_in(team_ids.clone()))
                .one(&state.db)
                .await?
                .is_some()
        };

        let milestones = Milestones::find()
            .filter(MilestoneColumn::ProjectId.eq(project.id))
            .all(&state.db)
            .await?;
        let deadline = milestones.iter().map(|m| m.due_date).max();

        let professor = Users::find_by_id(project.professor_id).one(&state.db).await?;
        let department = professor
            .as_ref()
            .and_then(|p| p.department.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        responses.push(AvailableProjectResponse {
            id: project.id,
            title: project.title,
            summary: project.description,
            professor: display_or_unknown(professor.as_ref()),
            department,
            tags: decode_tags(&project.tags),
            deadline: deadline.map(|d| d.to_string()),
            has_applied,
            deadline_passed: deadline.is_some_and(|d| d < today),
            status: project.status.to_string(),
        });
    }

    Ok(Json(responses))
}

/// Update a project's details
pub async fn update_project_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
    req: UpdateProjectRequest,
) -> Result<Json<ProjectResponse>> {
    principal.require_professor()?;
    req.validate()?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can update it"));
    }

    let mut active_model: entity::projects::ActiveModel = project.into();

    if let Some(title) = req.title {
        active_model.title = Set(title);
    }
    if let Some(description) = req.description {
        active_model.description = Set(description);
    }
    if let Some(year) = req.year {
        active_model.year = Set(year);
    }
    if let Some(tags) = req.tags {
        let encoded = serde_json::to_value(&tags)
            .map_err(|e| AppError::internal(format!("Failed to encode tags: {}", e)))?;
        active_model.tags = Set(Some(encoded));
    }

    let updated = active_model.update(&state.db).await?;

    info!(project_id = %project_id, actor_id = %principal.id, "Project updated");

    project_response(&state.db, updated).await.map(Json)
}

/// Update a project's status
pub async fn update_status_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
    req: UpdateProjectStatusRequest,
) -> Result<Json<ProjectResponse>> {
    principal.require_professor()?;
    req.validate()?;

    let status = parse_project_status(&req.status)?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can update it"));
    }

    let mut active_model: entity::projects::ActiveModel = project.into();
    active_model.status = Set(status);
    let updated = active_model.update(&state.db).await?;

    info!(project_id = %project_id, status = %updated.status, actor_id = %principal.id, "Project status updated");

    project_response(&state.db, updated).await.map(Json)
}

/// Attach a resource file to a project
pub async fn upload_resource_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
    filename: String,
    content: Vec<u8>,
) -> Result<Json<ResourceResponse>> {
    principal.require_professor()?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can attach resources"));
    }

    if filename.is_empty() {
        return Err(AppError::validation("A filename is required"));
    }

    let handle = state.storage.store(&content, &filename).await?;

    let resource = entity::project_resources::ActiveModel {
        project_id: Set(project_id),
        filename: Set(filename),
        handle: Set(handle.clone()),
        uploaded_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    let resource = match resource {
        Ok(r) => r,
        Err(e) => {
            // The record is the source of truth; drop the orphaned blob
            let _ = state.storage.remove(&handle).await;
            return Err(e.into());
        },
    };

    info!(project_id = %project_id, resource_id = %resource.id, "Project resource uploaded");

    Ok(Json(ResourceResponse {
        id:          resource.id,
        project_id:  resource.project_id,
        filename:    resource.filename,
        uploaded_at: resource.uploaded_at.to_rfc3339(),
    }))
}

/// Download a project resource
pub async fn download_resource_handler(
    state: &AppState,
    _principal: Principal,
    project_id: i32,
    resource_id: i32,
) -> Result<Response> {
    let resource = ProjectResources::find_by_id(resource_id)
        .one(&state.db)
        .await?
        .filter(|r| r.project_id == project_id)
        .ok_or_else(|| AppError::not_found("Resource not found"))?;

    let bytes = state.storage.fetch(&resource.handle).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", resource.filename.replace('"', "_")),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::internal(format!("Failed to build response: {}", e)))
}

/// Delete a project and everything it owns
///
/// The cascade is explicit and ordered so deletion order and
/// partial-failure behavior stay auditable: submission documents,
/// submissions, milestones, resources, applications, then the teams bound
/// to the project (with their membership edges and join requests), and
/// finally the project row. Stored files are removed after the transaction
/// commits.
pub async fn delete_project_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
) -> Result<Json<SuccessResponse>> {
    principal.require_professor()?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can delete it"));
    }

    let txn = state.db.begin().await?;

    let milestones = Milestones::find()
        .filter(MilestoneColumn::ProjectId.eq(project_id))
        .all(&txn)
        .await?;
    let milestone_ids: Vec<i32> = milestones.iter().map(|m| m.id).collect();

    let submissions = MilestoneSubmissions::find()
        .filter(SubmissionColumn::MilestoneId.is_in(milestone_ids.clone()))
        .all(&txn)
        .await?;
    let submission_ids: Vec<i32> = submissions.iter().map(|s| s.id).collect();

    // Collect content-store handles before the rows disappear
    let documents = SubmissionDocuments::find()
        .filter(DocumentColumn::SubmissionId.is_in(submission_ids.clone()))
        .all(&txn)
        .await?;
    let resources = ProjectResources::find()
        .filter(ResourceColumn::ProjectId.eq(project_id))
        .all(&txn)
        .await?;
    let mut handles: Vec<String> = documents.iter().map(|d| d.handle.clone()).collect();
    handles.extend(resources.iter().map(|r| r.handle.clone()));

    SubmissionDocuments::delete_many()
        .filter(DocumentColumn::SubmissionId.is_in(submission_ids))
        .exec(&txn)
        .await?;

    MilestoneSubmissions::delete_many()
        .filter(SubmissionColumn::MilestoneId.is_in(milestone_ids))
        .exec(&txn)
        .await?;

    Milestones::delete_many()
        .filter(MilestoneColumn::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;

    ProjectResources::delete_many()
        .filter(ResourceColumn::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;

    TeamApplications::delete_many()
        .filter(ApplicationColumn::ProjectId.eq(project_id))
        .exec(&txn)
        .await?;

    let teams = Teams::find()
        .filter(TeamColumn::ProjectId.eq(project_id))
        .all(&txn)
        .await?;
    for team in teams {
        TeamMembers::delete_many()
            .filter(MemberColumn::TeamId.eq(team.id))
            .exec(&txn)
            .await?;
        entity::student_team_applications::Entity::delete_many()
            .filter(entity::student_team_applications::Column::TeamId.eq(team.id))
            .exec(&txn)
            .await?;
        team.delete(&txn).await?;
    }

    project.delete(&txn).await?;

    txn.commit().await?;

    for handle in handles {
        if let Err(e) = state.storage.remove(&handle).await {
            warn!(handle = %handle, error = %e, "Failed to remove stored file during project deletion");
        }
    }

    info!(project_id = %project_id, actor_id = %principal.id, "Project deleted");

    Ok(Json(SuccessResponse {
        success: true,
        message: "Project deleted successfully".to_string(),
    }))
}

/// Decode the JSON tags column into a string list.
pub(crate) fn decode_tags(tags: &Option<serde_json::Value>) -> Vec<String> {
    tags.as_ref()
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// Compute a project's completion percentage: milestones submitted by the
/// approved team over total milestones, truncated to an integer. Zero when
/// the project has no milestones or no approved team.
pub(crate) async fn project_progress<C: ConnectionTrait>(
    conn: &C,
    project_id: i32,
) -> Result<u32> {
    let approved_team = Teams::find()
        .filter(TeamColumn::ProjectId.eq(project_id))
        .filter(TeamColumn::Status.eq(TeamStatus::Approved))
        .one(conn)
        .await?;

    let Some(team) = approved_team else {
        return Ok(0);
    };

    let milestones = Milestones::find()
        .filter(MilestoneColumn::ProjectId.eq(project_id))
        .all(conn)
        .await?;
    if milestones.is_empty() {
        return Ok(0);
    }

    let milestone_ids: Vec<i32> = milestones.iter().map(|m| m.id).collect();
    let completed = MilestoneSubmissions::find()
        .filter(SubmissionColumn::MilestoneId.is_in(milestone_ids))
        .filter(SubmissionColumn::TeamId.eq(team.id))
        .count(conn)
        .await?;

    Ok(((completed as f64 / milestones.len() as f64) * 100.0) as u32)
}

/// Build the response for a project.
pub(crate) async fn project_response<C: ConnectionTrait>(
    conn: &C,
    project: entity::projects::Model,
) -> Result<ProjectResponse> {
    let milestone_count = Milestones::find()
        .filter(MilestoneColumn::ProjectId.eq(project.id))
        .count(conn)
        .await?;

    Ok(ProjectResponse {
        id: project.id,
        title: project.title,
        description: project.description,
        year: project.year,
        tags: decode_tags(&project.tags),
        status: project.status.to_string(),
        professor_id: project.professor_id,
        milestone_count,
        created_at: project.created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_status_valid() {
        assert_eq!(parse_project_status("open").unwrap(), ProjectStatus::Open);
        assert_eq!(
            parse_project_status("IN_PROGRESS").unwrap(),
            ProjectStatus::InProgress
        );
        assert_eq!(
            parse_project_status("completed").unwrap(),
            ProjectStatus::Completed
        );
        assert_eq!(
            parse_project_status("cancelled").unwrap(),
            ProjectStatus::Cancelled
        );
    }

    #[test]
    fn test_parse_project_status_invalid() {
        assert!(parse_project_status("archived").is_err());
        assert!(parse_project_status("").is_err());
    }

    #[test]
    fn test_decode_tags() {
        let tags = Some(serde_json::json!(["systems", "rust"]));
        assert_eq!(decode_tags(&tags), vec!["systems", "rust"]);
        assert!(decode_tags(&None).is_empty());
        assert!(decode_tags(&Some(serde_json::json!("not-a-list"))).is_empty());
    }
}
