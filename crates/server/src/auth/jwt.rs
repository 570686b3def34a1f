//! # JWT Token Handling
//!
//! Validation (and, for tests and tooling, generation) of the access tokens
//! minted by the external identity issuer that shares our secret.

use std::{
    collections::HashSet,
    time::{Duration, SystemTime},
};

use error::{AppError, Result};
use jsonwebtoken::{EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration shared with the identity issuer.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Base64-encoded HMAC secret
    pub secret:             String,
    /// Access-token lifetime in seconds
    pub expiration_seconds: u64,
    /// Expected token issuer
    pub issuer:             String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret:             std::env::var("CAPSTONE_JWT_SECRET").unwrap_or_default(),
            expiration_seconds: std::env::var("CAPSTONE_JWT_EXPIRATION_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            issuer:             std::env::var("CAPSTONE_JWT_ISSUER").unwrap_or_else(|_| "capstone-identity".to_string()),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (numeric user ID)
    pub sub: i32,

    /// User role (student, professor, admin)
    pub role: String,

    /// Token issuer
    pub iss: String,

    /// Expiration time (Unix timestamp)
    pub exp: u64,

    /// Issued at (Unix timestamp)
    pub iat: u64,
}

/// Creates a new access token.
///
/// The production issuer lives outside this service; this function exists for
/// integration tests and operational tooling that share the secret.
///
/// # Errors
///
/// Returns an error if token encoding fails.
pub fn create_access_token(config: &JwtConfig, user_id: i32, role: &str) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_err(|e| AppError::unauthorized(format!("Failed to get current time: {}", e)))?;

    let issued_at = now.as_secs();
    let expiration = now + Duration::from_secs(config.expiration_seconds);

    let claims = Claims {
        sub:  user_id,
        role: role.to_string(),
        iss:  config.issuer.clone(),
        exp:  expiration.as_secs(),
        iat:  issued_at,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_base64_secret(&config.secret)
            .map_err(|e| AppError::unauthorized(format!("Invalid JWT secret: {}", e)))?,
    )
    .map_err(|e| AppError::unauthorized(format!("Failed to encode token: {}", e)))?;

    Ok(token)
}

/// Validates a JWT token and returns the claims.
///
/// # Errors
///
/// Returns an error if token validation fails.
pub fn validate_token(config: &JwtConfig, token: &str) -> Result<Claims> {
    let decoding_key = jsonwebtoken::DecodingKey::from_base64_secret(&config.secret)
        .map_err(|e| AppError::unauthorized(format!("Invalid JWT secret: {}", e)))?;

    let mut validation = Validation::default();
    let mut iss_set = HashSet::new();
    iss_set.insert(config.issuer.clone());
    validation.iss = Some(iss_set);
    validation.validate_exp = true;

    let claims = jsonwebtoken::decode(token, &decoding_key, &validation)
        .map_err(|e| AppError::unauthorized(format!("Token validation failed: {}", e)))?;

    Ok(claims.claims)
}

/// Extracts the Bearer token from the Authorization header.
///
/// # Returns
///
/// The token string if present, or None if missing/invalid.
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    if !auth_header.starts_with("Bearer ") {
        return None;
    }

    let token = auth_header.trim_start_matches("Bearer ").trim();

    if token.is_empty() {
        return None;
    }

    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use base64::Engine;

    use super::*;

    fn test_config() -> JwtConfig {
        let secret = "test-secret-key-that-is-at-least-32-bytes-long";
        JwtConfig {
            secret:             base64::engine::general_purpose::STANDARD.encode(secret),
            expiration_seconds: 3600,
            issuer:             "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_create_and_validate_token() {
        let config = test_config();
        let token = create_access_token(&config, 42, "student").unwrap();
        let claims = validate_token(&config, &token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "student");
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn test_validate_rejects_wrong_issuer() {
        let config = test_config();
        let token = create_access_token(&config, 1, "professor").unwrap();

        let mut other = config.clone();
        other.issuer = "someone-else".to_string();
        assert!(validate_token(&other, &token).is_err());
    }

    #[test]
    fn test_validate_rejects_tampered_token() {
        let config = test_config();
        let token = create_access_token(&config, 1, "student").unwrap();
        let tampered = format!("{}x", token);
        assert!(validate_token(&config, &tampered).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token("Bearer abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
