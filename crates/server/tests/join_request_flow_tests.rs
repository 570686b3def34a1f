//! Integration tests for the join-request workflow: apply/approve/reject
//! transitions, terminal-state guards, and the capacity re-check at
//! approval time.

mod common;

use common::{create_student, principal_for, TestApp};
use entity::sea_orm_active_enums::TeamStatus;
use sea_orm::EntityTrait;
use server::dto::teams::{AddMemberRequest, CreateTeamRequest, JoinTeamRequest};
use server::teams::{self, join_requests};

async fn team_with_leader(app: &TestApp, leader: &entity::users::Model) -> i32 {
    teams::create_team_handler(
        &app.state,
        principal_for(leader),
        CreateTeamRequest {
            name:       "Joinable".to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap()
    .0
    .team
    .id
}

#[tokio::test]
async fn apply_creates_pending_request() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    let request = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: Some("I bring tests".to_string()),
        },
    )
    .await
    .unwrap()
    .0;

    assert_eq!(request.status, "pending");
    assert_eq!(request.student_id, applicant.id);
    assert_eq!(request.team_id, team_id);
}

#[tokio::test]
async fn apply_rejects_members_and_duplicates() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    // The leader is already a member
    let err = join_requests::apply_handler(
        &app.state,
        principal_for(&leader),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ALREADY_MEMBER");

    join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap();

    let err = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "DUPLICATE_APPLICATION");
}

#[tokio::test]
async fn approve_adds_member() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    let request = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap()
    .0;

    let approved = join_requests::approve_handler(&app.state, principal_for(&leader), request.id)
        .await
        .unwrap()
        .0;
    assert_eq!(approved.status, "approved");

    let detail = teams::get_team_handler(&app.state, principal_for(&leader), team_id)
        .await
        .unwrap()
        .0;
    assert_eq!(detail.team.member_count, 2);
    assert!(detail.members.iter().any(|m| m.id == applicant.id));

    // The decision is terminal
    let err = join_requests::approve_handler(&app.state, principal_for(&leader), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");
}

#[tokio::test]
async fn approve_requires_leadership() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    let request = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap()
    .0;

    let err = join_requests::approve_handler(&app.state, principal_for(&applicant), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_LEADER");
}

#[tokio::test]
async fn approve_against_full_team_rejects_the_request() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    let request = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap()
    .0;

    // The team fills up while the request waits
    for i in 0 .. 3 {
        let member = create_student(&app.state, &format!("m{}@uni.edu", i), "Mem Ber").await;
        teams::add_member_handler(
            &app.state,
            principal_for(&leader),
            team_id,
            AddMemberRequest {
                student_id: member.id,
            },
        )
        .await
        .unwrap();
    }

    let err = join_requests::approve_handler(&app.state, principal_for(&leader), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TEAM_FULL");

    // The outcome is persisted, not silently dropped
    let stored = entity::student_team_applications::Entity::find_by_id(request.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, TeamStatus::Rejected);

    let detail = teams::get_team_handler(&app.state, principal_for(&leader), team_id)
        .await
        .unwrap()
        .0;
    assert_eq!(detail.team.member_count, 4);
}

#[tokio::test]
async fn reject_is_terminal() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    let request = join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap()
    .0;

    let rejected = join_requests::reject_handler(&app.state, principal_for(&leader), request.id)
        .await
        .unwrap()
        .0;
    assert_eq!(rejected.status, "rejected");

    let err = join_requests::reject_handler(&app.state, principal_for(&leader), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");

    // No member was added
    let detail = teams::get_team_handler(&app.state, principal_for(&leader), team_id)
        .await
        .unwrap()
        .0;
    assert_eq!(detail.team.member_count, 1);
}

#[tokio::test]
async fn listings_are_scoped() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let applicant = create_student(&app.state, "app@uni.edu", "App Licant").await;
    let team_id = team_with_leader(&app, &leader).await;

    join_requests::apply_handler(
        &app.state,
        principal_for(&applicant),
        team_id,
        JoinTeamRequest {
            message: None,
        },
    )
    .await
    .unwrap();

    let for_team = join_requests::list_for_team_handler(&app.state, principal_for(&leader), team_id)
        .await
        .unwrap()
        .0;
    assert_eq!(for_team.requests.len(), 1);

    let err = join_requests::list_for_team_handler(&app.state, principal_for(&applicant), team_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_LEADER");

    let mine = join_requests::my_requests_handler(&app.state, principal_for(&applicant))
        .await
        .unwrap()
        .0;
    assert_eq!(mine.requests.len(), 1);
    assert_eq!(mine.requests[0].team_name, "Joinable");
}
