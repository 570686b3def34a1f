//! Entity definitions for Capstone
//!
//! This crate contains Sea-ORM entity definitions for the database models:
//! users, projects, teams and the workflow records that connect them.

pub mod sea_orm_active_enums;

pub mod users;
pub use users::Entity as Users;
pub mod projects;
pub use projects::Entity as Projects;
pub mod project_resources;
pub use project_resources::Entity as ProjectResources;
pub mod teams;
pub use teams::Entity as Teams;
pub mod team_members;
pub use team_members::Entity as TeamMembers;
pub mod team_applications;
pub use team_applications::Entity as TeamApplications;
pub mod student_team_applications;
pub use student_team_applications::Entity as StudentTeamApplications;
pub mod milestones;
pub use milestones::Entity as Milestones;
pub mod milestone_submissions;
pub use milestone_submissions::Entity as MilestoneSubmissions;
pub mod submission_documents;
pub use submission_documents::Entity as SubmissionDocuments;
