//! # HTTP Middleware
//!
//! Middleware applied to the protected API surface.

pub mod auth;

pub use auth::{auth_middleware, Principal};
