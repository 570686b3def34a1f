//! # Milestone Data Transfer Objects
//!
//! Request and response types for the milestone lifecycle: definition,
//! submission and grading.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to add a milestone to an existing project
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct CreateMilestoneRequest {
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

/// A file uploaded with a submission, already read off the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Filename as supplied by the client
    pub filename: String,
    /// Raw content
    pub content:  Vec<u8>,
}

/// Request to submit milestone work for a team
///
/// Built by the routing layer from a multipart form; files arrive fully
/// buffered.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SubmitMilestoneRequest {
    /// The submitting team
    #[validate(range(min = 1, message = "Team ID is required"))]
    pub team_id: i32,
    /// Submission text
    pub text:    Option<String>,
    /// External links, appended to the submission body
    pub links:   Vec<String>,
    /// Attached documents
    pub files:   Vec<UploadedFile>,
}

/// Request to grade a milestone for a team
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct GradeMilestoneRequest {
    /// The graded team
    #[validate(range(min = 1, message = "Team ID is required"))]
    pub team_id:  i32,
    /// Grade in [0, 100]
    pub grade:    f32,
    /// Feedback text
    #[validate(length(max = 8000, message = "Feedback must not exceed 8000 characters"))]
    pub feedback: Option<String>,
}

/// Request to grade an existing submission by its ID
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct GradeSubmissionRequest {
    /// Grade in [0, 100]
    pub grade:    f32,
    /// Feedback text
    #[validate(length(max = 8000, message = "Feedback must not exceed 8000 characters"))]
    pub feedback: Option<String>,
}

/// Response for a milestone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilestoneResponse {
    /// Milestone's unique identifier
    pub id:          i32,
    /// Owning project
    pub project_id:  i32,
    /// Milestone title
    pub title:       String,
    /// Milestone description
    pub description: Option<String>,
    /// Due date (RFC 3339 date)
    pub due_date:    String,
    /// Percentage contribution to the project grade
    pub weightage:   f32,
}

/// A milestone as seen by a team, with submission state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMilestoneResponse {
    /// The milestone
    #[serde(flatten)]
    pub milestone:       MilestoneResponse,
    /// Whether the submission slot is taken
    pub submitted:       bool,
    /// Submission timestamp, when submitted (RFC 3339)
    pub submission_date: Option<String>,
    /// Grade, when graded
    pub grade:           Option<f32>,
    /// Feedback, when provided
    pub feedback:        Option<String>,
}

/// A document attached to a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    /// Document record ID
    pub id:          i32,
    /// Original filename
    pub filename:    String,
    /// Upload timestamp (RFC 3339)
    pub uploaded_at: String,
}

/// Response for a submission, as listed for professors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionResponse {
    /// Submission record ID
    pub submission_id:   i32,
    /// Submitted milestone
    pub milestone_id:    i32,
    /// Milestone title
    pub milestone_title: String,
    /// Owning project
    pub project_id:      i32,
    /// Submitting team
    pub team_id:         i32,
    /// Team name
    pub team_name:       String,
    /// Submission timestamp (RFC 3339)
    pub submitted_at:    String,
    /// Submission body
    pub body:            Option<String>,
    /// Grade, when graded
    pub grade:           Option<f32>,
    /// Feedback, when provided
    pub feedback:        Option<String>,
    /// Whether a grade has been recorded
    pub is_graded:       bool,
    /// Attached documents
    pub documents:       Vec<DocumentInfo>,
}

/// Response for submission lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionListResponse {
    /// Whether the operation was successful
    pub success:     bool,
    /// Submissions
    pub submissions: Vec<SubmissionResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_milestone_request_valid() {
        let req = CreateMilestoneRequest {
            title:       "Prototype".to_string(),
            description: Some("Working end-to-end demo".to_string()),
            due_date:    "2025-04-15".to_string(),
            weightage:   30.0,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_milestone_request_missing_due_date() {
        let req = CreateMilestoneRequest {
            title:       "Prototype".to_string(),
            description: None,
            due_date:    String::new(),
            weightage:   30.0,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_submit_request_requires_team() {
        let req = SubmitMilestoneRequest {
            team_id: 0,
            text:    None,
            links:   vec![],
            files:   vec![],
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_grade_request_feedback_cap() {
        let req = GradeMilestoneRequest {
            team_id:  1,
            grade:    85.0,
            feedback: Some("x".repeat(8001)),
        };
        assert!(req.validate().is_err());
    }
}
