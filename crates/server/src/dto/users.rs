//! # User Data Transfer Objects
//!
//! Request and response types for roster management. Credentials never
//! appear here; authentication is the identity collaborator's concern.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to add a user to the roster
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address, unique across the roster
    #[validate(email(message = "A valid email address is required"))]
    pub email:      String,
    /// Full name
    #[validate(length(min = 1, max = 255, message = "Full name is required"))]
    pub full_name:  String,
    /// Role (student, professor, admin)
    #[validate(length(min = 1, message = "Role is required"))]
    pub role:       String,
    /// Department
    pub department: Option<String>,
    /// Academic year, for students
    pub year:       Option<String>,
}

/// Request for a student to update their own profile
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Comma-separated skills
    #[validate(length(max = 2000, message = "Skills must not exceed 2000 characters"))]
    pub skills:       Option<String>,
    /// Comma-separated interests
    #[validate(length(max = 2000, message = "Interests must not exceed 2000 characters"))]
    pub interests:    Option<String>,
    /// Availability description
    #[validate(length(max = 255, message = "Availability must not exceed 255 characters"))]
    pub availability: Option<String>,
}

/// Response for a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    /// User's unique identifier
    pub id:         i32,
    /// Email address
    pub email:      String,
    /// Full name
    pub full_name:  String,
    /// Role
    pub role:       String,
    /// Department
    pub department: Option<String>,
    /// Academic year
    pub year:       Option<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

/// A student as listed in the collaboration directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDirectoryEntry {
    /// Student user ID
    pub id:           i32,
    /// Full name
    pub name:         String,
    /// Academic year, "Unknown" when not recorded
    pub year:         String,
    /// Department, "Unknown" when not recorded
    pub department:   String,
    /// Skills
    pub skills:       Option<String>,
    /// Interests
    pub interests:    Option<String>,
    /// Availability
    pub availability: Option<String>,
    /// Initials derived from the full name
    pub initials:     String,
    /// Teams the student belongs to
    pub teams:        Vec<i32>,
}

/// Response for user lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListResponse {
    /// Whether the operation was successful
    pub success: bool,
    /// Users
    pub users:   Vec<UserResponse>,
}

/// Response for the student directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentDirectoryResponse {
    /// Whether the operation was successful
    pub success:  bool,
    /// Students
    pub students: Vec<StudentDirectoryEntry>,
}
