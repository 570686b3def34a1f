//! Teams Entity
//!
//! A student-formed team. `project_id` is the pessimistic reservation made
//! when the team applies to a project; it is cleared again when the
//! application is withdrawn or the team is rejected. A partial unique index
//! (`ux_teams_project_approved`) guarantees at most one approved team per
//! project.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sea_orm_active_enums::TeamStatus;

/// Maximum number of members a team may ever have, the leader included.
pub const MAX_TEAM_SIZE: u64 = 4;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:         i32,
    pub name:       String,
    pub project_id: Option<i32>,
    pub leader_id:  i32,
    pub is_locked:  bool,
    pub status:     TeamStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Project,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LeaderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Leader,
    #[sea_orm(has_many = "super::team_members::Entity")]
    Members,
    #[sea_orm(has_many = "super::team_applications::Entity")]
    Applications,
    #[sea_orm(has_many = "super::student_team_applications::Entity")]
    JoinRequests,
    #[sea_orm(has_many = "super::milestone_submissions::Entity")]
    Submissions,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { Relation::Project.def() }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::Leader.def() }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::Members.def() }
}

impl Related<super::team_applications::Entity> for Entity {
    fn to() -> RelationDef { Relation::Applications.def() }
}

impl Related<super::student_team_applications::Entity> for Entity {
    fn to() -> RelationDef { Relation::JoinRequests.def() }
}

impl Related<super::milestone_submissions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Submissions.def() }
}

impl ActiveModelBehavior for ActiveModel {}
