//! # Project Data Transfer Objects
//!
//! Request and response types for project management and the
//! project-application workflow.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A milestone supplied inline with project creation
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct MilestoneInput {
    /// Milestone title
    #[validate(length(min = 1, max = 255, message = "Milestone title is required"))]
    pub title:       String,
    /// Milestone description
    pub description: Option<String>,
    /// Due date, YYYY-MM-DD
    #[validate(length(min = 1, message = "Due date is required"))]
    pub due_date:    String,
    /// Percentage contribution to the project grade, (0, 100]
    pub weightage:   f32,
}

/// Request to create a new project
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title:       String,
    /// Project description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Academic year the project targets
    #[validate(length(min = 1, max = 64, message = "Year is required"))]
    pub year:        String,
    /// Free-form tags
    pub tags:        Option<Vec<String>>,
    /// Milestones created together with the project
    #[serde(default)]
    #[validate(nested)]
    pub milestones:  Vec<MilestoneInput>,
}

/// Request to update an existing project
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// Updated title
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title:       Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated year
    pub year:        Option<String>,
    /// Updated tags
    pub tags:        Option<Vec<String>>,
}

/// Request to change a project's status
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateProjectStatusRequest {
    /// New status (open, in_progress, completed, cancelled)
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Response for a single project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectResponse {
    /// Project's unique identifier
    pub id:           i32,
    /// Project title
    pub title:        String,
    /// Project description
    pub description:  String,
    /// Academic year
    pub year:         String,
    /// Tags
    pub tags:         Vec<String>,
    /// Project status
    pub status:       String,
    /// Owning professor's user ID
    pub professor_id: i32,
    /// Number of milestones
    pub milestone_count: u64,
    /// Creation timestamp (RFC 3339)
    pub created_at:   String,
}

/// Response for project lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectListResponse {
    /// Whether the operation was successful
    pub success:  bool,
    /// Projects
    pub projects: Vec<ProjectResponse>,
}

/// A project as seen by a browsing student
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableProjectResponse {
    /// Project's unique identifier
    pub id:              i32,
    /// Project title
    pub title:           String,
    /// Project description
    pub summary:         String,
    /// Professor full name, "Unknown" when the user row is missing
    pub professor:       String,
    /// Professor department, "Unknown" when not recorded
    pub department:      String,
    /// Tags
    pub tags:            Vec<String>,
    /// Latest milestone due date (RFC 3339 date), if any milestones exist
    pub deadline:        Option<String>,
    /// Whether one of the student's teams already applied
    pub has_applied:     bool,
    /// Whether the derived deadline is in the past
    pub deadline_passed: bool,
    /// Project status
    pub status:          String,
}

/// Request for a team to apply to a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct ApplyTeamRequest {
    /// The applying team
    #[validate(range(min = 1, message = "Team ID is required"))]
    pub team_id:    i32,
    /// The project applied to
    #[validate(range(min = 1, message = "Project ID is required"))]
    pub project_id: i32,
    /// Motivation shown to the professor
    #[validate(length(max = 4000, message = "Motivation must not exceed 4000 characters"))]
    pub motivation: Option<String>,
}

/// Request for a professor to set a team's status directly
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateTeamStatusRequest {
    /// New status (approved, rejected, pending)
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Response for a team application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamApplicationResponse {
    /// Application record ID
    pub id:            i32,
    /// Project applied to
    pub project_id:    i32,
    /// Project title
    pub project_title: String,
    /// Applying team
    pub team_id:       i32,
    /// Team name
    pub team_name:     String,
    /// Application status
    pub status:        String,
    /// Motivation text
    pub motivation:    Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at:    String,
}

/// Response for application lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamApplicationListResponse {
    /// Whether the operation was successful
    pub success:      bool,
    /// Applications
    pub applications: Vec<TeamApplicationResponse>,
}

/// Response for an uploaded project resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceResponse {
    /// Resource record ID
    pub id:          i32,
    /// Owning project
    pub project_id:  i32,
    /// Original filename
    pub filename:    String,
    /// Upload timestamp (RFC 3339)
    pub uploaded_at: String,
}

/// Generic success response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_valid() {
        let req = CreateProjectRequest {
            title:       "Distributed key-value store".to_string(),
            description: "Build and evaluate a replicated KV store".to_string(),
            year:        "4".to_string(),
            tags:        Some(vec!["systems".to_string()]),
            milestones:  vec![MilestoneInput {
                title:       "Design document".to_string(),
                description: None,
                due_date:    "2025-03-01".to_string(),
                weightage:   20.0,
            }],
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_project_request_missing_title() {
        let req = CreateProjectRequest {
            title:       String::new(),
            description: "d".to_string(),
            year:        "4".to_string(),
            tags:        None,
            milestones:  vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_nested_milestone_validation() {
        let req = CreateProjectRequest {
            title:       "t".to_string(),
            description: "d".to_string(),
            year:        "4".to_string(),
            tags:        None,
            milestones:  vec![MilestoneInput {
                title:       String::new(),
                description: None,
                due_date:    "2025-03-01".to_string(),
                weightage:   20.0,
            }],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_apply_team_request_requires_ids() {
        let req = ApplyTeamRequest {
            team_id:    0,
            project_id: 1,
            motivation: None,
        };
        assert!(req.validate().is_err());
    }
}
