//! # Capstone API Server
//!
//! Axum-based HTTP API server for the Capstone project-coordination system.
//!
//! ## Modules
//!
//! - [`auth`]: JWT validation for the identity collaborator
//! - [`dto`]: Request/response data transfer objects
//! - [`middleware`]: HTTP middleware (principal extraction, request ids)
//! - [`router`]: API route configuration
//! - [`storage`]: Content-store collaborator for uploaded files
//! - [`teams`]: Team registry and join-request workflow
//! - [`projects`]: Projects, applications, milestones, aggregation views
//! - [`users`]: Roster management

pub mod auth;
pub mod dto;
pub mod middleware;
pub mod projects;
pub mod router;
pub mod storage;
pub mod teams;
pub mod users;

pub use router::create_app_router;

use auth::jwt::JwtConfig;
use storage::ContentStore;

/// Application state shared across request handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection pool
    pub db:         sea_orm::DbConn,
    /// JWT configuration for the identity collaborator
    pub jwt_config: JwtConfig,
    /// Content store for uploaded files
    pub storage:    ContentStore,
}
