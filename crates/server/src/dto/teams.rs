//! # Team Data Transfer Objects
//!
//! Request and response types for the team registry and the join-request
//! workflow.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a new team
///
/// The acting student becomes the leader and is counted as a member whether
/// or not they appear in `member_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(
        min = 1,
        max = 255,
        message = "Team name must be between 1 and 255 characters"
    ))]
    pub name:       String,
    /// Founding members (student user IDs)
    #[serde(default)]
    pub member_ids: Vec<i32>,
}

/// Request to add a member to a team
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Student user ID to add
    #[validate(range(min = 1, message = "Student ID is required"))]
    pub student_id: i32,
}

/// Request to join an existing team
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct JoinTeamRequest {
    /// Message shown to the team leader
    #[validate(length(max = 2000, message = "Message must not exceed 2000 characters"))]
    pub message: Option<String>,
}

/// A member of a team, with the user row resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMemberInfo {
    /// Student user ID
    pub id:        i32,
    /// Full name, "Unknown" when the user row is missing
    pub name:      String,
    /// Email, "unknown" when the user row is missing
    pub email:     String,
    /// Academic year, if recorded
    pub year:      Option<String>,
    /// Whether this member leads the team
    pub is_leader: bool,
}

/// Response for a single team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamResponse {
    /// Team's unique identifier
    pub id:             i32,
    /// Team name
    pub name:           String,
    /// Number of members
    pub member_count:   u64,
    /// Maximum team size
    pub max_members:    u64,
    /// Titles of projects the team is bound to
    pub project_titles: Vec<String>,
    /// Whether the team accepts new members
    pub is_open:        bool,
    /// Leader user ID
    pub leader_id:      i32,
    /// Leader full name, "Unknown" when the user row is missing
    pub leader_name:    String,
    /// Team status
    pub status:         String,
}

/// Response for a team with resolved members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamDetailResponse {
    /// The team summary
    #[serde(flatten)]
    pub team:    TeamResponse,
    /// Resolved members
    pub members: Vec<TeamMemberInfo>,
}

/// Response for team list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamListResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// List of teams
    pub teams:   Vec<TeamResponse>,
}

/// Response for a join request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequestResponse {
    /// Application record ID
    pub id:           i32,
    /// Team applied to
    pub team_id:      i32,
    /// Team name
    pub team_name:    String,
    /// Applicant student ID
    pub student_id:   i32,
    /// Applicant full name, "Unknown" when the user row is missing
    pub student_name: String,
    /// Application status
    pub status:       String,
    /// Message to the leader
    pub message:      Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at:   String,
}

/// Response for join request lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinRequestListResponse {
    /// Whether the operation was successful
    pub success:  bool,
    /// Join requests
    pub requests: Vec<JoinRequestResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_valid() {
        let req = CreateTeamRequest {
            name:       "Compilers".to_string(),
            member_ids: vec![2, 3],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_team_request_empty_name() {
        let req = CreateTeamRequest {
            name:       String::new(),
            member_ids: vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_add_member_request_rejects_zero_id() {
        let req = AddMemberRequest {
            student_id: 0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_join_team_request_message_too_long() {
        let req = JoinTeamRequest {
            message: Some("x".repeat(2001)),
        };
        assert!(req.validate().is_err());
    }
}
