//! # Capstone Error Infrastructure
//!
//! Error types and API response handling for the Capstone application.
//!
//! Every business-rule rejection raised by the workflow engine is a distinct
//! variant so the routing layer can map it to a transport status without
//! inspecting message text.

pub mod middleware;
pub mod response;
pub mod traits;

pub use middleware::ErrorHandler;
pub use response::{ApiResponse, PaginationMeta};
pub use traits::ResultExt;

/// Convenience type alias for Result with AppError.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Main application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("NotFound: {message}")]
    NotFound { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("NotOwner: {message}")]
    NotOwner { message: String },

    #[error("NotLeader: {message}")]
    NotLeader { message: String },

    #[error("NotTeamMember: {message}")]
    NotTeamMember { message: String },

    #[error("InvalidTransition: {message}")]
    InvalidTransition { message: String },

    #[error("CapacityExceeded: {message}")]
    CapacityExceeded { message: String },

    #[error("TeamFull: {message}")]
    TeamFull { message: String },

    #[error("TeamLocked: {message}")]
    TeamLocked { message: String },

    #[error("DuplicateMember: {message}")]
    DuplicateMember { message: String },

    #[error("DuplicateApplication: {message}")]
    DuplicateApplication { message: String },

    #[error("AlreadyMember: {message}")]
    AlreadyMember { message: String },

    #[error("AlreadySubmitted: {message}")]
    AlreadySubmitted { message: String },

    #[error("AlreadyAssigned: {message}")]
    AlreadyAssigned { message: String },

    #[error("TeamMismatch: {message}")]
    TeamMismatch { message: String },

    #[error("DeadlinePassed: {message}")]
    DeadlinePassed { message: String },

    #[error("InvalidGrade: {message}")]
    InvalidGrade { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation: {message}")]
    Validation { message: String },

    #[error("Internal: {message}")]
    Internal { message: String },

    #[error("Database: {message}")]
    Database { message: String },

    #[error("IO: {message}")]
    Io { message: String },

    #[error("Config: {message}")]
    Config { message: String },

    #[error("Migration: {message}")]
    Migration { message: String },
}

macro_rules! ctor {
    ($($(#[$doc:meta])* $fn_name:ident => $variant:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            pub fn $fn_name(message: impl ToString) -> Self {
                Self::$variant {
                    message: message.to_string(),
                }
            }
        )+
    };
}

impl AppError {
    ctor! {
        /// Create a not found error.
        not_found => NotFound,
        /// Create an unauthorized error.
        unauthorized => Unauthorized,
        /// Create a not-owner error (professor does not own the project).
        not_owner => NotOwner,
        /// Create a not-leader error (student is not the team leader).
        not_leader => NotLeader,
        /// Create a not-team-member error.
        not_team_member => NotTeamMember,
        /// Create an invalid state-machine transition error.
        invalid_transition => InvalidTransition,
        /// Create a capacity exceeded error (team created with too many members).
        capacity_exceeded => CapacityExceeded,
        /// Create a team full error (membership would exceed the cap).
        team_full => TeamFull,
        /// Create a team locked error.
        team_locked => TeamLocked,
        /// Create a duplicate member error.
        duplicate_member => DuplicateMember,
        /// Create a duplicate application error.
        duplicate_application => DuplicateApplication,
        /// Create an already-member error.
        already_member => AlreadyMember,
        /// Create an already-submitted error.
        already_submitted => AlreadySubmitted,
        /// Create an already-assigned error.
        already_assigned => AlreadyAssigned,
        /// Create a team mismatch error (team not bound to the milestone's project).
        team_mismatch => TeamMismatch,
        /// Create a deadline passed error.
        deadline_passed => DeadlinePassed,
        /// Create an invalid grade error.
        invalid_grade => InvalidGrade,
        /// Create a generic uniqueness conflict error.
        conflict => Conflict,
        /// Create a validation error.
        validation => Validation,
        /// Create an internal error.
        internal => Internal,
        /// Create a database error.
        database => Database,
        /// Create a config error.
        config => Config,
        /// Create a migration error.
        migration => Migration,
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> http::StatusCode {
        match self {
            AppError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => http::StatusCode::UNAUTHORIZED,
            AppError::NotOwner { .. } | AppError::NotLeader { .. } | AppError::NotTeamMember { .. } => {
                http::StatusCode::FORBIDDEN
            },
            AppError::InvalidTransition { .. }
            | AppError::CapacityExceeded { .. }
            | AppError::TeamFull { .. }
            | AppError::TeamLocked { .. }
            | AppError::DuplicateMember { .. }
            | AppError::DuplicateApplication { .. }
            | AppError::AlreadyMember { .. }
            | AppError::AlreadySubmitted { .. }
            | AppError::AlreadyAssigned { .. }
            | AppError::Conflict { .. } => http::StatusCode::CONFLICT,
            AppError::TeamMismatch { .. } | AppError::DeadlinePassed { .. } | AppError::InvalidGrade { .. } => {
                http::StatusCode::BAD_REQUEST
            },
            AppError::Validation { .. } => http::StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal { .. }
            | AppError::Database { .. }
            | AppError::Io { .. }
            | AppError::Config { .. }
            | AppError::Migration { .. } => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Unauthorized { .. } => "UNAUTHORIZED",
            AppError::NotOwner { .. } => "NOT_OWNER",
            AppError::NotLeader { .. } => "NOT_LEADER",
            AppError::NotTeamMember { .. } => "NOT_TEAM_MEMBER",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            AppError::TeamFull { .. } => "TEAM_FULL",
            AppError::TeamLocked { .. } => "TEAM_LOCKED",
            AppError::DuplicateMember { .. } => "DUPLICATE_MEMBER",
            AppError::DuplicateApplication { .. } => "DUPLICATE_APPLICATION",
            AppError::AlreadyMember { .. } => "ALREADY_MEMBER",
            AppError::AlreadySubmitted { .. } => "ALREADY_SUBMITTED",
            AppError::AlreadyAssigned { .. } => "ALREADY_ASSIGNED",
            AppError::TeamMismatch { .. } => "TEAM_MISMATCH",
            AppError::DeadlinePassed { .. } => "DEADLINE_PASSED",
            AppError::InvalidGrade { .. } => "INVALID_GRADE",
            AppError::Conflict { .. } => "CONFLICT",
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
            AppError::Database { .. } => "DATABASE_ERROR",
            AppError::Io { .. } => "IO_ERROR",
            AppError::Config { .. } => "CONFIG_ERROR",
            AppError::Migration { .. } => "MIGRATION_ERROR",
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound { message }
            | AppError::Unauthorized { message }
            | AppError::NotOwner { message }
            | AppError::NotLeader { message }
            | AppError::NotTeamMember { message }
            | AppError::InvalidTransition { message }
            | AppError::CapacityExceeded { message }
            | AppError::TeamFull { message }
            | AppError::TeamLocked { message }
            | AppError::DuplicateMember { message }
            | AppError::DuplicateApplication { message }
            | AppError::AlreadyMember { message }
            | AppError::AlreadySubmitted { message }
            | AppError::AlreadyAssigned { message }
            | AppError::TeamMismatch { message }
            | AppError::DeadlinePassed { message }
            | AppError::InvalidGrade { message }
            | AppError::Conflict { message }
            | AppError::Validation { message }
            | AppError::Internal { message }
            | AppError::Database { message }
            | AppError::Io { message }
            | AppError::Config { message }
            | AppError::Migration { message } => message.clone(),
        }
    }

    /// Add context to the error, prefixing the message.
    #[inline]
    pub fn context(mut self, context: impl ToString) -> Self {
        let prefix = context.to_string();
        match &mut self {
            AppError::NotFound { message }
            | AppError::Unauthorized { message }
            | AppError::NotOwner { message }
            | AppError::NotLeader { message }
            | AppError::NotTeamMember { message }
            | AppError::InvalidTransition { message }
            | AppError::CapacityExceeded { message }
            | AppError::TeamFull { message }
            | AppError::TeamLocked { message }
            | AppError::DuplicateMember { message }
            | AppError::DuplicateApplication { message }
            | AppError::AlreadyMember { message }
            | AppError::AlreadySubmitted { message }
            | AppError::AlreadyAssigned { message }
            | AppError::TeamMismatch { message }
            | AppError::DeadlinePassed { message }
            | AppError::InvalidGrade { message }
            | AppError::Conflict { message }
            | AppError::Validation { message }
            | AppError::Internal { message }
            | AppError::Database { message }
            | AppError::Io { message }
            | AppError::Config { message }
            | AppError::Migration { message } => {
                *message = format!("{}: {}", prefix, message);
            },
        }
        self
    }
}

/// Convert anyhow errors to AppError.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

/// Convert std::io errors to AppError.
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Convert String to AppError.
impl From<String> for AppError {
    fn from(s: String) -> Self { Self::Validation { message: s } }
}

/// Convert &str to AppError.
impl From<&str> for AppError {
    fn from(s: &str) -> Self { Self::from(s.to_string()) }
}

/// Convert Sea-ORM database errors to AppError.
///
/// Missing-record errors keep their NotFound identity; everything else is a
/// store fault.
impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match &err {
            sea_orm::DbErr::RecordNotFound(msg) => {
                Self::NotFound {
                    message: msg.clone(),
                }
            },
            _ => {
                Self::Database {
                    message: err.to_string(),
                }
            },
        }
    }
}

/// Convert validator validation errors to AppError.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(_, errors)| {
                errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "Invalid value".to_string())
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        let message = if messages.is_empty() {
            "Validation failed".to_string()
        }
        else {
            messages.join(", ")
        };

        Self::Validation {
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_not_found() {
        let err = AppError::not_found("Team");
        assert_eq!(err.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(err.to_string().contains("NotFound"));
    }

    #[test]
    fn test_error_unauthorized() {
        let err = AppError::unauthorized("Token expired");
        assert_eq!(err.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_relationship_errors_are_forbidden() {
        assert_eq!(
            AppError::not_owner("x").status(),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_leader("x").status(),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::not_team_member("x").status(),
            http::StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_uniqueness_guards_are_conflicts() {
        assert_eq!(AppError::team_full("x").status(), http::StatusCode::CONFLICT);
        assert_eq!(
            AppError::already_member("x").status(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::already_submitted("x").status(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::already_assigned("x").status(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::duplicate_application("x").status(),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::invalid_transition("x").status(),
            http::StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_temporal_and_range_guards_are_bad_requests() {
        assert_eq!(
            AppError::deadline_passed("x").status(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::invalid_grade("x").status(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::team_mismatch("x").status(),
            http::StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_validation() {
        let err = AppError::validation("Invalid date");
        assert_eq!(err.status(), http::StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_error_database() {
        let err = AppError::database("Connection failed");
        assert_eq!(err.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_error_context() {
        let err = AppError::not_found("Milestone").context("Grading submission");
        assert_eq!(err.message(), "Grading submission: Milestone");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_from_db_record_not_found() {
        let err: AppError = sea_orm::DbErr::RecordNotFound("Team not found".to_string()).into();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_from_db_other() {
        let err: AppError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_from_anyhow() {
        let anyhow_err = anyhow::anyhow!("Test error");
        let err: AppError = anyhow_err.into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AppError = io_err.into();
        assert_eq!(err.code(), "IO_ERROR");
    }

    #[test]
    fn test_from_validation_errors() {
        use validator::Validate;

        #[derive(Validate)]
        struct TestStruct {
            #[validate(range(min = 1, max = 100))]
            value: i32,
        }

        let s = TestStruct {
            value: 150,
        };
        let errors = s.validate().unwrap_err();
        let app_error: AppError = errors.into();

        match app_error {
            AppError::Validation {
                message,
            } => {
                assert!(!message.is_empty());
            },
            _ => panic!("Expected Validation error"),
        }
    }
}
