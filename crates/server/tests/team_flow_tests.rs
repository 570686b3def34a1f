//! Integration tests for the team registry: creation invariants and
//! membership capacity under the add-member path.

mod common;

use common::{create_student, principal_for, TestApp};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use server::dto::teams::{AddMemberRequest, CreateTeamRequest};
use server::teams;

#[tokio::test]
async fn create_team_includes_leader_as_member() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let mate = create_student(&app.state, "mate@uni.edu", "Tea Mate").await;

    let response = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Compilers".to_string(),
            member_ids: vec![mate.id],
        },
    )
    .await
    .unwrap();

    let detail = response.0;
    assert_eq!(detail.team.member_count, 2);
    assert_eq!(detail.team.leader_id, leader.id);
    assert!(detail.members.iter().any(|m| m.id == leader.id && m.is_leader));
    assert!(detail.members.iter().any(|m| m.id == mate.id && !m.is_leader));
    assert!(detail.team.is_open);
}

#[tokio::test]
async fn create_team_rejects_oversized_roster() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let mut ids = Vec::new();
    for i in 0 .. 4 {
        let member = create_student(&app.state, &format!("s{}@uni.edu", i), "Stu Dent").await;
        ids.push(member.id);
    }

    let err = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Too big".to_string(),
            member_ids: ids,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn create_team_rejects_duplicate_members() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let mate = create_student(&app.state, "mate@uni.edu", "Tea Mate").await;

    let err = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Dupes".to_string(),
            member_ids: vec![mate.id, mate.id],
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "DUPLICATE_MEMBER");
}

#[tokio::test]
async fn create_team_rejects_unknown_member() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;

    let err = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Ghosts".to_string(),
            member_ids: vec![9999],
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "NOT_FOUND");
}

#[tokio::test]
async fn add_member_enforces_capacity() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;

    let team = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Growing".to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap()
    .0;

    // Fill the remaining three slots
    for i in 0 .. 3 {
        let member = create_student(&app.state, &format!("m{}@uni.edu", i), "Mem Ber").await;
        teams::add_member_handler(
            &app.state,
            principal_for(&leader),
            team.team.id,
            AddMemberRequest {
                student_id: member.id,
            },
        )
        .await
        .unwrap();
    }

    // The fifth member does not fit
    let overflow = create_student(&app.state, "late@uni.edu", "Late Comer").await;
    let err = teams::add_member_handler(
        &app.state,
        principal_for(&leader),
        team.team.id,
        AddMemberRequest {
            student_id: overflow.id,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "TEAM_FULL");

    let detail = teams::get_team_handler(&app.state, principal_for(&leader), team.team.id)
        .await
        .unwrap()
        .0;
    assert_eq!(detail.team.member_count, 4);
    assert!(!detail.team.is_open);
}

#[tokio::test]
async fn add_member_rejects_duplicates_and_strangers() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let mate = create_student(&app.state, "mate@uni.edu", "Tea Mate").await;
    let stranger = create_student(&app.state, "str@uni.edu", "Stran Ger").await;

    let team = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Guarded".to_string(),
            member_ids: vec![mate.id],
        },
    )
    .await
    .unwrap()
    .0;

    let err = teams::add_member_handler(
        &app.state,
        principal_for(&leader),
        team.team.id,
        AddMemberRequest {
            student_id: mate.id,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "ALREADY_MEMBER");

    let err = teams::add_member_handler(
        &app.state,
        principal_for(&stranger),
        team.team.id,
        AddMemberRequest {
            student_id: stranger.id,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code(), "NOT_LEADER");
}

#[tokio::test]
async fn add_member_respects_lock() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let mate = create_student(&app.state, "mate@uni.edu", "Tea Mate").await;

    let team = teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Locked".to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap()
    .0;

    let model = entity::teams::Entity::find_by_id(team.team.id)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut lock: entity::teams::ActiveModel = model.into();
    lock.is_locked = Set(true);
    lock.update(&app.state.db).await.unwrap();

    let err = teams::add_member_handler(
        &app.state,
        principal_for(&leader),
        team.team.id,
        AddMemberRequest {
            student_id: mate.id,
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "TEAM_LOCKED");
}

#[tokio::test]
async fn my_teams_lists_only_memberships() {
    let app = TestApp::new().await;
    let leader = create_student(&app.state, "lead@uni.edu", "Lea Der").await;
    let other = create_student(&app.state, "other@uni.edu", "Ot Her").await;

    teams::create_team_handler(
        &app.state,
        principal_for(&leader),
        CreateTeamRequest {
            name:       "Mine".to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap();

    teams::create_team_handler(
        &app.state,
        principal_for(&other),
        CreateTeamRequest {
            name:       "Theirs".to_string(),
            member_ids: vec![],
        },
    )
    .await
    .unwrap();

    let mine = teams::my_teams_handler(&app.state, principal_for(&leader))
        .await
        .unwrap()
        .0;
    assert_eq!(mine.teams.len(), 1);
    assert_eq!(mine.teams[0].name, "Mine");

    let all = teams::list_teams_handler(&app.state, principal_for(&leader))
        .await
        .unwrap()
        .0;
    assert_eq!(all.teams.len(), 2);
}
