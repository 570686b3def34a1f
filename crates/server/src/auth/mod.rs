//! # Identity Collaborator
//!
//! Validation of externally-issued JWTs. Token issuance, registration and
//! password handling live with the identity provider; this module only
//! verifies tokens and exposes the claims they carry.

pub mod jwt;

pub use jwt::{extract_bearer_token, validate_token, Claims, JwtConfig};
