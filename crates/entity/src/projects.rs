//! Projects Entity
//!
//! A project published by a professor. Owns its milestones, resources and
//! team applications; at most one team is approved for it at a time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sea_orm_active_enums::ProjectStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:           i32,
    pub title:        String,
    #[sea_orm(column_type = "Text")]
    pub description:  String,
    pub year:         String,
    #[sea_orm(column_type = "Json", nullable)]
    pub tags:         Option<Json>,
    pub status:       ProjectStatus,
    pub professor_id: i32,
    pub created_at:   chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ProfessorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Professor,
    #[sea_orm(has_many = "super::milestones::Entity")]
    Milestones,
    #[sea_orm(has_many = "super::project_resources::Entity")]
    Resources,
    #[sea_orm(has_many = "super::team_applications::Entity")]
    TeamApplications,
    #[sea_orm(has_many = "super::teams::Entity")]
    Teams,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef { Relation::Professor.def() }
}

impl Related<super::milestones::Entity> for Entity {
    fn to() -> RelationDef { Relation::Milestones.def() }
}

impl Related<super::project_resources::Entity> for Entity {
    fn to() -> RelationDef { Relation::Resources.def() }
}

impl Related<super::team_applications::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamApplications.def() }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Teams.def() }
}

impl ActiveModelBehavior for ActiveModel {}
