//! # Data Transfer Objects
//!
//! Request and response types for the API surface. Requests are validated
//! once here, at the boundary; workflow code receives already-typed input.

pub mod milestones;
pub mod projects;
pub mod teams;
pub mod users;
