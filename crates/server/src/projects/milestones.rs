//! # Milestone Lifecycle
//!
//! Milestone definition by professors, the single-shot team submission with
//! its deadline gate, and grading. Grading may precede a submission: the
//! professor's first grade creates the submission record (administrative
//! override), later grades overwrite in place.

use axum::Json;
use chrono::NaiveDate;
use entity::{
    milestone_submissions::{Column as SubmissionColumn, Entity as MilestoneSubmissions},
    milestones::{Column as MilestoneColumn, Entity as Milestones},
    projects::{Column as ProjectColumn, Entity as Projects},
    submission_documents::{Column as DocumentColumn, Entity as SubmissionDocuments},
    teams::Entity as Teams,
};
use error::{AppError, Result};
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    Set,
    TransactionTrait,
};
use tracing::info;
use validator::Validate;

use crate::{
    dto::milestones::{
        CreateMilestoneRequest,
        DocumentInfo,
        GradeMilestoneRequest,
        GradeSubmissionRequest,
        MilestoneResponse,
        SubmissionListResponse,
        SubmissionResponse,
        SubmitMilestoneRequest,
        TeamMilestoneResponse,
    },
    middleware::auth::Principal,
    projects::can_manage_project,
    teams::is_member,
    AppState,
};

/// Parse a YYYY-MM-DD due date.
pub(crate) fn parse_due_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation("Invalid due date format. Use YYYY-MM-DD"))
}

/// Validate a milestone weightage: (0, 100].
pub(crate) fn validate_weightage(weightage: f32) -> Result<()> {
    if weightage > 0.0 && weightage <= 100.0 {
        Ok(())
    }
    else {
        Err(AppError::validation(
            "Weightage must be greater than 0 and at most 100",
        ))
    }
}

/// Validate a grade: [0, 100].
fn validate_grade(grade: f32) -> Result<()> {
    if (0.0 ..= 100.0).contains(&grade) {
        Ok(())
    }
    else {
        Err(AppError::invalid_grade("Grade must be between 0 and 100"))
    }
}

/// Add a milestone to an existing project
pub async fn add_milestone_handler(
    state: &AppState,
    principal: Principal,
    project_id: i32,
    req: CreateMilestoneRequest,
) -> Result<Json<MilestoneResponse>> {
    principal.require_professor()?;
    req.validate()?;
    validate_weightage(req.weightage)?;
    let due_date = parse_due_date(&req.due_date)?;

    let project = Projects::find_by_id(project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can add milestones"));
    }

    let milestone = entity::milestones::ActiveModel {
        project_id: Set(project_id),
        title: Set(req.title),
        description: Set(req.description),
        due_date: Set(due_date),
        weightage: Set(req.weightage),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(milestone_id = %milestone.id, project_id = %project_id, actor_id = %principal.id, "Milestone added");

    Ok(Json(milestone_response(milestone)))
}

/// Submit milestone work for a team
///
/// Single-shot: the milestone's one submission slot is taken atomically with
/// the deadline and membership guards. Uploaded files go through the content
/// store; stored blobs are removed again if the transaction fails.
pub async fn submit_handler(
    state: &AppState,
    principal: Principal,
    milestone_id: i32,
    req: SubmitMilestoneRequest,
) -> Result<Json<SubmissionResponse>> {
    principal.require_student()?;
    req.validate()?;

    let milestone = Milestones::find_by_id(milestone_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone not found"))?;

    let team = Teams::find_by_id(req.team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if team.project_id != Some(milestone.project_id) {
        return Err(AppError::team_mismatch("Team is not assigned to this milestone's project"));
    }

    if !is_member(&state.db, team.id, principal.id).await? {
        return Err(AppError::not_team_member("You are not a member of this team"));
    }

    let today = chrono::Utc::now().date_naive();
    if today > milestone.due_date {
        return Err(AppError::deadline_passed("Milestone deadline has passed"));
    }

    // Assemble the body: free text plus the links block
    let mut body = req.text.unwrap_or_default();
    if !req.links.is_empty() {
        if !body.is_empty() {
            body.push_str("\n\n");
        }
        body.push_str("Links:\n");
        body.push_str(&req.links.join("\n"));
    }

    let txn = state.db.begin().await?;

    // The slot may have been taken since the guard above; re-check inside
    // the transaction that writes
    let existing = MilestoneSubmissions::find()
        .filter(SubmissionColumn::MilestoneId.eq(milestone_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        txn.rollback().await?;
        return Err(AppError::already_submitted("This milestone has already been submitted"));
    }

    let submission = entity::milestone_submissions::ActiveModel {
        milestone_id: Set(milestone_id),
        team_id: Set(team.id),
        submitted_at: Set(chrono::Utc::now()),
        body: Set(if body.is_empty() { None } else { Some(body) }),
        grade: Set(None),
        feedback: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    // Files go to the content store first; the rows follow in the same
    // transaction. Any failure discards the blobs already written.
    let mut stored_handles: Vec<String> = Vec::with_capacity(req.files.len());
    for file in &req.files {
        let handle = match state.storage.store(&file.content, &file.filename).await {
            Ok(handle) => handle,
            Err(e) => {
                discard_handles(state, &stored_handles).await;
                txn.rollback().await?;
                return Err(e);
            },
        };
        stored_handles.push(handle.clone());

        let document = entity::submission_documents::ActiveModel {
            submission_id: Set(submission.id),
            filename: Set(file.filename.clone()),
            handle: Set(handle),
            uploaded_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await;
        if let Err(e) = document {
            discard_handles(state, &stored_handles).await;
            txn.rollback().await?;
            return Err(e.into());
        }
    }

    if let Err(e) = txn.commit().await {
        discard_handles(state, &stored_handles).await;
        return Err(e.into());
    }

    info!(
        submission_id = %submission.id,
        milestone_id = %milestone_id,
        team_id = %team.id,
        student_id = %principal.id,
        files = stored_handles.len(),
        "Milestone submitted"
    );

    submission_response(&state.db, submission, &milestone, &team.name).await.map(Json)
}

/// Grade a milestone for a team
///
/// Owner-only. Creates the submission record when none exists yet; grading
/// is idempotent-by-overwrite.
pub async fn grade_milestone_handler(
    state: &AppState,
    principal: Principal,
    milestone_id: i32,
    req: GradeMilestoneRequest,
) -> Result<Json<SubmissionResponse>> {
    req.validate()?;

    let milestone = Milestones::find_by_id(milestone_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone not found"))?;

    grade_inner(state, principal, milestone, req.team_id, req.grade, req.feedback).await
}

/// Grade an existing submission by its ID
///
/// Thin adapter over the canonical (milestone, team) grading operation.
pub async fn grade_submission_handler(
    state: &AppState,
    principal: Principal,
    submission_id: i32,
    req: GradeSubmissionRequest,
) -> Result<Json<SubmissionResponse>> {
    req.validate()?;

    let submission = MilestoneSubmissions::find_by_id(submission_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Submission not found"))?;

    let milestone = Milestones::find_by_id(submission.milestone_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Milestone not found"))?;

    grade_inner(state, principal, milestone, submission.team_id, req.grade, req.feedback).await
}

/// The canonical grading transition.
async fn grade_inner(
    state: &AppState,
    principal: Principal,
    milestone: entity::milestones::Model,
    team_id: i32,
    grade: f32,
    feedback: Option<String>,
) -> Result<Json<SubmissionResponse>> {
    principal.require_professor()?;
    validate_grade(grade)?;

    let project = Projects::find_by_id(milestone.project_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Project not found"))?;

    if !can_manage_project(&principal, &project) {
        return Err(AppError::not_owner("Only the professor who created the project can grade submissions"));
    }

    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if team.project_id != Some(milestone.project_id) {
        return Err(AppError::team_mismatch("Team is not assigned to this milestone's project"));
    }

    let txn = state.db.begin().await?;

    let existing = MilestoneSubmissions::find()
        .filter(SubmissionColumn::MilestoneId.eq(milestone.id))
        .one(&txn)
        .await?;

    let graded = match existing {
        Some(submission) => {
            if submission.team_id != team_id {
                txn.rollback().await?;
                return Err(AppError::team_mismatch("The submission for this milestone belongs to another team"));
            }
            let mut update: entity::milestone_submissions::ActiveModel = submission.into();
            update.grade = Set(Some(grade));
            update.feedback = Set(feedback);
            update.update(&txn).await?
        },
        None => {
            // Administrative override: grading before any student submission
            entity::milestone_submissions::ActiveModel {
                milestone_id: Set(milestone.id),
                team_id: Set(team_id),
                submitted_at: Set(chrono::Utc::now()),
                body: Set(None),
                grade: Set(Some(grade)),
                feedback: Set(feedback),
                ..Default::default()
            }
            .insert(&txn)
            .await?
        },
    };

    txn.commit().await?;

    info!(
        submission_id = %graded.id,
        milestone_id = %milestone.id,
        team_id = %team_id,
        grade = grade,
        actor_id = %principal.id,
        "Submission graded"
    );

    submission_response(&state.db, graded, &milestone, &team.name).await.map(Json)
}

/// List submissions across the acting professor's projects
pub async fn list_submissions_handler(
    state: &AppState,
    principal: Principal,
    project_id: Option<i32>,
) -> Result<Json<SubmissionListResponse>> {
    principal.require_professor()?;

    let mut project_query = Projects::find();
    if !principal.is_admin() {
        project_query = project_query.filter(ProjectColumn::ProfessorId.eq(principal.id));
    }
    if let Some(project_id) = project_id {
        project_query = project_query.filter(ProjectColumn::Id.eq(project_id));
    }
    let projects = project_query.all(&state.db).await?;
    if projects.is_empty() {
        return Ok(Json(SubmissionListResponse {
            success:     true,
            submissions: vec![],
        }));
    }

    let project_ids: Vec<i32> = projects.iter().map(|p| p.id).collect();
    let milestones = Milestones::find()
        .filter(MilestoneColumn::ProjectId.is_in(project_ids))
        .all(&state.db)
        .await?;
    let milestone_ids: Vec<i32> = milestones.iter().map(|m| m.id).collect();

    let submissions = MilestoneSubmissions::find()
        .filter(SubmissionColumn::MilestoneId.is_in(milestone_ids))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let Some(milestone) = milestones.iter().find(|m| m.id == submission.milestone_id) else {
            continue;
        };
        let team_name = Teams::find_by_id(submission.team_id)
            .one(&state.db)
            .await?
            .map(|t| t.name)
            .unwrap_or_else(|| "Unknown".to_string());
        responses.push(submission_response(&state.db, submission, milestone, &team_name).await?);
    }

    Ok(Json(SubmissionListResponse {
        success:     true,
        submissions: responses,
    }))
}

/// List a team's milestones with submission state
pub async fn team_milestones_handler(
    state: &AppState,
    principal: Principal,
    team_id: i32,
) -> Result<Json<Vec<TeamMilestoneResponse>>> {
    principal.require_student()?;

    let team = Teams::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !is_member(&state.db, team_id, principal.id).await? {
        return Err(AppError::not_team_member("You are not a member of this team"));
    }

    let Some(project_id) = team.project_id else {
        return Ok(Json(vec![]));
    };

    let milestones = Milestones::find()
        .filter(MilestoneColumn::ProjectId.eq(project_id))
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(milestones.len());
    for milestone in milestones {
        let submission = MilestoneSubmissions::find()
            .filter(SubmissionColumn::MilestoneId.eq(milestone.id))
            .filter(SubmissionColumn::TeamId.eq(team_id))
            .one(&state.db)
            .await?;

        responses.push(TeamMilestoneResponse {
            submitted:       submission.is_some(),
            submission_date: submission.as_ref().map(|s| s.submitted_at.to_rfc3339()),
            grade:           submission.as_ref().and_then(|s| s.grade),
            feedback:        submission.and_then(|s| s.feedback),
            milestone:       milestone_response(milestone),
        });
    }

    Ok(Json(responses))
}

/// Remove already-stored blobs after a failed submission write.
async fn discard_handles(state: &AppState, handles: &[String]) {
    for handle in handles {
        if let Err(e) = state.storage.remove(handle).await {
            tracing::warn!(handle = %handle, error = %e, "Failed to discard stored file");
        }
    }
}

/// Build the response for a milestone.
fn milestone_response(milestone: entity::milestones::Model) -> MilestoneResponse {
    MilestoneResponse {
        id:          milestone.id,
        project_id:  milestone.project_id,
        title:       milestone.title,
        description: milestone.description,
        due_date:    milestone.due_date.to_string(),
        weightage:   milestone.weightage,
    }
}

/// Build the response for a submission, documents resolved.
async fn submission_response<C: ConnectionTrait>(
    conn: &C,
    submission: entity::milestone_submissions::Model,
    milestone: &entity::milestones::Model,
    team_name: &str,
) -> Result<SubmissionResponse> {
    let documents = SubmissionDocuments::find()
        .filter(DocumentColumn::SubmissionId.eq(submission.id))
        .all(conn)
        .await?
        .into_iter()
        .map(|d| {
            DocumentInfo {
                id:          d.id,
                filename:    d.filename,
                uploaded_at: d.uploaded_at.to_rfc3339(),
            }
        })
        .collect();

    Ok(SubmissionResponse {
        submission_id: submission.id,
        milestone_id: submission.milestone_id,
        milestone_title: milestone.title.clone(),
        project_id: milestone.project_id,
        team_id: submission.team_id,
        team_name: team_name.to_string(),
        submitted_at: submission.submitted_at.to_rfc3339(),
        body: submission.body,
        grade: submission.grade,
        feedback: submission.feedback,
        is_graded: submission.grade.is_some(),
        documents,
    })
}
