//! Active enums shared by the Capstone entities.
//!
//! All enums are stored as plain strings so the schema is valid on both
//! Postgres and SQLite.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Forms teams, applies to projects, submits milestone work
    #[sea_orm(string_value = "student")]
    Student,
    /// Publishes projects, defines milestones, grades submissions
    #[sea_orm(string_value = "professor")]
    Professor,
    /// Passes every ownership and leadership check
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Student => write!(f, "student"),
            UserRole::Professor => write!(f, "professor"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

/// Lifecycle status of a project.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Open => write!(f, "open"),
            ProjectStatus::InProgress => write!(f, "in_progress"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Status shared by teams and both application workflows.
///
/// `Pending -> {Approved, Rejected}`; both outcomes are terminal.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl TeamStatus {
    /// Whether this status is a terminal state of the application workflows.
    pub fn is_terminal(&self) -> bool { !matches!(self, TeamStatus::Pending) }
}

impl std::fmt::Display for TeamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamStatus::Pending => write!(f, "pending"),
            TeamStatus::Approved => write!(f, "approved"),
            TeamStatus::Rejected => write!(f, "rejected"),
        }
    }
}
