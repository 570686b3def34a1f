//! Submission Documents Entity
//!
//! A file attached to a milestone submission. `handle` is the opaque
//! content-store identifier; `filename` is the name the student uploaded.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "submission_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id:            i32,
    pub submission_id: i32,
    pub filename:      String,
    pub handle:        String,
    pub uploaded_at:   chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::milestone_submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::milestone_submissions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Submission,
}

impl Related<super::milestone_submissions::Entity> for Entity {
    fn to() -> RelationDef { Relation::Submission.def() }
}

impl ActiveModelBehavior for ActiveModel {}
