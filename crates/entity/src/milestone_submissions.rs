//! Milestone Submissions Entity
//!
//! The single submission slot of a milestone (`milestone_id` is unique).
//! Grade and feedback are written only by the owning professor; grading may
//! create the row before any student submission exists.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milestone_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:           i32,
    #[sea_orm(unique)]
    pub milestone_id: i32,
    pub team_id:      i32,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    #[sea_orm(column_type = "Text", nullable)]
    pub body:         Option<String>,
    pub grade:        Option<f32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback:     Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::milestones::Entity",
        from = "Column::MilestoneId",
        to = "super::milestones::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Milestone,
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(has_many = "super::submission_documents::Entity")]
    Documents,
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef { Relation::Milestone.def() }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl Related<super::submission_documents::Entity> for Entity {
    fn to() -> RelationDef { Relation::Documents.def() }
}

impl ActiveModelBehavior for ActiveModel {}
