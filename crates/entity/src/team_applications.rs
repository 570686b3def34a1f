//! Team Applications Entity
//!
//! A team's bid for a project, decided by the owning professor. One
//! application per (project, team) pair; withdrawal deletes the row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::sea_orm_active_enums::TeamStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "team_applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:         i32,
    pub project_id: i32,
    pub team_id:    i32,
    pub status:     TeamStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub motivation: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
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
    #[sea_orm(
        belongs_to = "super::teams::Entity",
        from = "Column::TeamId",
        to = "super::teams::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Team,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef { Relation::Project.def() }
}

impl Related<super::teams::Entity> for Entity {
    fn to() -> RelationDef { Relation::Team.def() }
}

impl ActiveModelBehavior for ActiveModel {}
