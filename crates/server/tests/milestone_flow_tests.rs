//! Integration tests for the milestone lifecycle: definition, the
//! single-shot deadline-gated submission, and grading with its
//! administrative-override path.

mod common;

use common::{create_professor, create_student, date_from_today, principal_for, TestApp};
use sea_orm::EntityTrait;
use server::dto::milestones::{
    CreateMilestoneRequest,
    GradeMilestoneRequest,
    GradeSubmissionRequest,
    SubmitMilestoneRequest,
    UploadedFile,
};
use server::dto::projects::{ApplyTeamRequest, CreateProjectRequest};
use server::dto::teams::CreateTeamRequest;
use server::projects::{self, applications, milestones};
use server::teams;

async fn create_project(app: &TestApp, professor: &entity::users::Model, title: &str) -> i32 {
    projects::create_project_handler(
        &app.state,
        principal_for(professor),
        CreateProjectRequest {
            title:       title.to_string(),
            description: "A project".to_string(),
            year:        "4".to_string(),
            tags:        None,
            milestones:  vec![],
        },
    )
    .await
    .unwrap()
    .0
    .id
}

async fn add_milestone(
    app: &TestApp,
    professor: &entity::users::Model,
    project_id: i32,
    title: &str,
    due_in_days: i64,
) -> i32 {
    milestones::add_milestone_handler(
        &app.state,
        principal_for(professor),
        project_id,
        CreateMilestoneRequest {
            title:       title.to_string(),
            description: None,
            due_date:    date_from_today(due_in_days),
            weightage:   25.0,
        },
    )
    .await
    .unwrap()
    .0
    .id
}

/// A team led by `leader`, with its application to `project_id` approved.
async fn assigned_team(
    app: &TestApp,
    leader: &entity::users::Model,
    professor: &entity::users::Model,
    project_id: i32,
    name: &str,
) -> i32 {
    let team_id = teams::create_team_handler(
        &app.state,
        principal_for(leader),
        CreateTeamRequest {
            name:       name.to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap()
    .0
    .team
    .id;

    let application = applications::apply_handler(
        &app.state,
        principal_for(leader),
        ApplyTeamRequest {
            team_id,
            project_id,
            motivation: None,
        },
    )
    .await
    .unwrap()
    .0;

    applications::approve_handler(&app.state, principal_for(professor), application.id)
        .await
        .unwrap();

    team_id
}

fn submit_request(team_id: i32, text: &str) -> SubmitMilestoneRequest {
    SubmitMilestoneRequest {
        team_id,
        text: Some(text.to_string()),
        links: vec![],
        files: vec![],
    }
}

#[tokio::test]
async fn add_milestone_requires_ownership_and_valid_input() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let other_prof = create_professor(&app.state, "other@uni.edu", "Ot Her").await;
    let project_id = create_project(&app, &prof, "KV store").await;

    let err = milestones::add_milestone_handler(
        &app.state,
        principal_for(&other_prof),
        project_id,
        CreateMilestoneRequest {
            title:       "Design".to_string(),
            description: None,
            due_date:    date_from_today(30),
            weightage:   25.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "NOT_OWNER");

    // Weightage is (0, 100]
    let err = milestones::add_milestone_handler(
        &app.state,
        principal_for(&prof),
        project_id,
        CreateMilestoneRequest {
            title:       "Design".to_string(),
            description: None,
            due_date:    date_from_today(30),
            weightage:   0.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    // Dates are parsed at the boundary
    let err = milestones::add_milestone_handler(
        &app.state,
        principal_for(&prof),
        project_id,
        CreateMilestoneRequest {
            title:       "Design".to_string(),
            description: None,
            due_date:    "next tuesday".to_string(),
            weightage:   25.0,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn submit_records_body_links_and_files() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    let submission = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        milestone_id,
        SubmitMilestoneRequest {
            team_id,
            text: Some("Design document attached".to_string()),
            links: vec!["https://repo.example/alpha".to_string()],
            files: vec![UploadedFile {
                filename: "design.pdf".to_string(),
                content:  b"%PDF-1.4 stub".to_vec(),
            }],
        },
    )
    .await
    .unwrap()
    .0;

    assert_eq!(submission.milestone_id, milestone_id);
    assert_eq!(submission.team_id, team_id);
    assert!(!submission.is_graded);

    let body = submission.body.unwrap();
    assert!(body.contains("Design document attached"));
    assert!(body.contains("Links:"));
    assert!(body.contains("https://repo.example/alpha"));

    assert_eq!(submission.documents.len(), 1);
    assert_eq!(submission.documents[0].filename, "design.pdf");

    // The blob is actually in the content store
    let handle = entity::submission_documents::Entity::find_by_id(submission.documents[0].id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap()
        .handle;
    let bytes = app.state.storage.fetch(&handle).await.unwrap();
    assert_eq!(bytes, b"%PDF-1.4 stub");
}

#[tokio::test]
async fn submit_is_single_shot() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        milestone_id,
        submit_request(team_id, "first"),
    )
    .await
    .unwrap();

    let err = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        milestone_id,
        submit_request(team_id, "second"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ALREADY_SUBMITTED");
}

#[tokio::test]
async fn submit_deadline_is_inclusive() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let due_today = add_milestone(&app, &prof, project_id, "Due today", 0).await;
    let overdue = add_milestone(&app, &prof, project_id, "Overdue", -1).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    // Submitting on the due date itself succeeds
    milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        due_today,
        submit_request(team_id, "just in time"),
    )
    .await
    .unwrap();

    let err = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        overdue,
        submit_request(team_id, "too late"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "DEADLINE_PASSED");
}

#[tokio::test]
async fn submit_guards_team_and_membership() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let other_leader = create_student(&app.state, "other@uni.edu", "Ot Her").await;
    let outsider = create_student(&app.state, "out@uni.edu", "Out Sider").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let other_project = create_project(&app, &prof, "Tracer").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;
    let unrelated_team = assigned_team(&app, &other_leader, &prof, other_project, "Beta").await;

    // Unknown milestone
    let err = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        9999,
        submit_request(team_id, "x"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    // A team assigned to another project cannot take the slot
    let err = milestones::submit_handler(
        &app.state,
        principal_for(&other_leader),
        milestone_id,
        submit_request(unrelated_team, "x"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "TEAM_MISMATCH");

    // Only members submit for a team
    let err = milestones::submit_handler(
        &app.state,
        principal_for(&outsider),
        milestone_id,
        submit_request(team_id, "x"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "NOT_TEAM_MEMBER");
}

#[tokio::test]
async fn grade_validates_range_and_ownership() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let other_prof = create_professor(&app.state, "other@uni.edu", "Ot Her").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    let err = milestones::grade_milestone_handler(
        &app.state,
        principal_for(&prof),
        milestone_id,
        GradeMilestoneRequest {
            team_id,
            grade: 150.0,
            feedback: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "INVALID_GRADE");

    let err = milestones::grade_milestone_handler(
        &app.state,
        principal_for(&other_prof),
        milestone_id,
        GradeMilestoneRequest {
            team_id,
            grade: 80.0,
            feedback: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "NOT_OWNER");
}

#[tokio::test]
async fn grade_before_submission_creates_the_record() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    // No student submission exists yet
    let graded = milestones::grade_milestone_handler(
        &app.state,
        principal_for(&prof),
        milestone_id,
        GradeMilestoneRequest {
            team_id,
            grade: 60.0,
            feedback: Some("Graded from the design review meeting".to_string()),
        },
    )
    .await
    .unwrap()
    .0;

    assert!(graded.is_graded);
    assert_eq!(graded.grade, Some(60.0));
    assert_eq!(graded.body, None);

    // The fabricated record now occupies the milestone's single slot
    let err = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        milestone_id,
        submit_request(team_id, "late work"),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ALREADY_SUBMITTED");
}

#[tokio::test]
async fn grade_overwrites_in_place() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    let submission = milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        milestone_id,
        submit_request(team_id, "our design"),
    )
    .await
    .unwrap()
    .0;

    milestones::grade_milestone_handler(
        &app.state,
        principal_for(&prof),
        milestone_id,
        GradeMilestoneRequest {
            team_id,
            grade: 70.0,
            feedback: Some("Solid start".to_string()),
        },
    )
    .await
    .unwrap();

    // Regrading through the submission-id adapter replaces grade and feedback
    let regraded = milestones::grade_submission_handler(
        &app.state,
        principal_for(&prof),
        submission.submission_id,
        GradeSubmissionRequest {
            grade:    85.0,
            feedback: Some("Revised after the demo".to_string()),
        },
    )
    .await
    .unwrap()
    .0;

    assert_eq!(regraded.submission_id, submission.submission_id);
    assert_eq!(regraded.grade, Some(85.0));
    assert_eq!(regraded.feedback.as_deref(), Some("Revised after the demo"));

    let stored = entity::milestone_submissions::Entity::find_by_id(submission.submission_id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.grade, Some(85.0));
}

#[tokio::test]
async fn grade_rejects_a_team_from_another_project() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let other_leader = create_student(&app.state, "other@uni.edu", "Ot Her").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let other_project = create_project(&app, &prof, "Tracer").await;
    let milestone_id = add_milestone(&app, &prof, project_id, "Design", 30).await;
    assigned_team(&app, &leader, &prof, project_id, "Alpha").await;
    let unrelated_team = assigned_team(&app, &other_leader, &prof, other_project, "Beta").await;

    let err = milestones::grade_milestone_handler(
        &app.state,
        principal_for(&prof),
        milestone_id,
        GradeMilestoneRequest {
            team_id:  unrelated_team,
            grade:    50.0,
            feedback: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "TEAM_MISMATCH");
}

#[tokio::test]
async fn listings_show_submission_state() {
    let app = TestApp::new().await;
    let prof = create_professor(&app.state, "prof@uni.edu", "Pro Fessor").await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let project_id = create_project(&app, &prof, "KV store").await;
    let submitted = add_milestone(&app, &prof, project_id, "Design", 30).await;
    let open = add_milestone(&app, &prof, project_id, "Prototype", 60).await;
    let team_id = assigned_team(&app, &leader, &prof, project_id, "Alpha").await;

    milestones::submit_handler(
        &app.state,
        principal_for(&leader),
        submitted,
        submit_request(team_id, "done"),
    )
    .await
    .unwrap();

    // The professor sees the one submission across their projects
    let listed = milestones::list_submissions_handler(&app.state, principal_for(&prof), Some(project_id))
        .await
        .unwrap()
        .0;
    assert_eq!(listed.submissions.len(), 1);
    assert_eq!(listed.submissions[0].milestone_id, submitted);
    assert_eq!(listed.submissions[0].team_name, "Alpha");

    // The team sees both milestones, one of them submitted
    let team_view = milestones::team_milestones_handler(&app.state, principal_for(&leader), team_id)
        .await
        .unwrap()
        .0;
    assert_eq!(team_view.len(), 2);

    let by_id = |id: i32| team_view.iter().find(|m| m.milestone.id == id).unwrap();
    assert!(by_id(submitted).submitted);
    assert!(by_id(submitted).submission_date.is_some());
    assert!(!by_id(open).submitted);
    assert!(by_id(open).grade.is_none());
}
