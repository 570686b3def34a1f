//! Users Entity
//!
//! A single roster table for every principal: students, professors and
//! admins. Student-profile columns (year, skills, interests, availability)
//! are null for the other roles.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sea_orm_active_enums::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:           i32,
    #[sea_orm(unique)]
    pub email:        String,
    pub full_name:    String,
    pub role:         UserRole,
    pub department:   Option<String>,
    pub year:         Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub skills:       Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub interests:    Option<String>,
    pub availability: Option<String>,
    pub created_at:   chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::projects::Entity")]
    Projects,
    #[sea_orm(has_many = "super::team_members::Entity")]
    TeamMemberships,
    #[sea_orm(has_many = "super::student_team_applications::Entity")]
    JoinRequests,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { Relation::Projects.def() }
}

impl Related<super::team_members::Entity> for Entity {
    fn to() -> RelationDef { Relation::TeamMemberships.def() }
}

impl Related<super::student_team_applications::Entity> for Entity {
    fn to() -> RelationDef { Relation::JoinRequests.def() }
}

impl ActiveModelBehavior for ActiveModel {}
