//! Milestones Entity
//!
//! A graded checkpoint of a project. The weightage is the advisory
//! percentage contribution to the overall project grade; it is validated to
//! (0, 100] but sums are not enforced.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "milestones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:          i32,
    pub project_id:  i32,
    pub title:       String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub due_date:    Date,
    pub weightage:   f32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Project,
    #[sea_orm(has_one = "super::milestone_submissions::Entity")]
    Submission,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { Relation::Project.def() }
}

impl Related<super::milestone_submissions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Submission.def() }
}

impl ActiveModelBehavior for ActiveModel {}
