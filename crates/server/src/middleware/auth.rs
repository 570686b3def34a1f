//! # Authentication Middleware
//!
//! Extracts the authenticated principal from the Bearer token on every
//! protected request. The principal gates every workflow mutation; handlers
//! never look at the token themselves.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use entity::sea_orm_active_enums::UserRole;
use error::{AppError, Result};
use serde_json::json;

use crate::{
    auth::jwt::{extract_bearer_token, validate_token},
    AppState,
};

/// The authenticated principal extracted from the JWT.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Stable numeric user ID
    pub id:   i32,
    /// Role carried by the token
    pub role: UserRole,
}

impl Principal {
    /// Whether this principal bypasses ownership and leadership checks.
    pub fn is_admin(&self) -> bool { matches!(self.role, UserRole::Admin) }

    /// Require the student role.
    pub fn require_student(&self) -> Result<()> {
        match self.role {
            UserRole::Student => Ok(()),
            _ => Err(AppError::unauthorized("This action requires a student account")),
        }
    }

    /// Require the professor role (admins pass).
    pub fn require_professor(&self) -> Result<()> {
        match self.role {
            UserRole::Professor | UserRole::Admin => Ok(()),
            UserRole::Student => Err(AppError::unauthorized("This action requires a professor account")),
        }
    }

    /// Require the admin role.
    pub fn require_admin(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        }
        else {
            Err(AppError::unauthorized("This action requires an admin account"))
        }
    }
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the JWT token
/// 3. Adds the authenticated principal to request extensions
/// 4. Rejects requests with invalid/missing tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let app_state = match request.extensions().get::<AppState>() {
        Some(state) => state,
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error",
            )
                .into_response();
        },
    };

    let jwt_config = app_state.jwt_config.clone();

    // Extract Authorization header
    let auth_header = match request.headers().get(header::AUTHORIZATION) {
        Some(header) => {
            match header.to_str() {
                Ok(h) => h,
                Err(_) => {
                    return create_auth_error_response("Invalid authorization header encoding");
                },
            }
        },
        None => {
            return create_auth_error_response("Missing authorization header");
        },
    };

    // Extract Bearer token
    let token = match extract_bearer_token(auth_header) {
        Some(token) => token,
        None => {
            return create_auth_error_response("Invalid authorization header format");
        },
    };

    // Validate token
    let claims = match validate_token(&jwt_config, &token) {
        Ok(claims) => claims,
        Err(e) => {
            let error_msg = e.to_string().to_lowercase();
            if error_msg.contains("expired") {
                return create_auth_error_response("Token has expired");
            }
            else if error_msg.contains("signature") {
                return create_auth_error_response("Invalid token signature");
            }
            else {
                return create_auth_error_response("Invalid token");
            }
        },
    };

    let role = match claims.role.as_str() {
        "student" => UserRole::Student,
        "professor" => UserRole::Professor,
        "admin" => UserRole::Admin,
        _ => {
            return create_auth_error_response("Unknown role in token");
        },
    };

    let principal = Principal {
        id: claims.sub,
        role,
    };

    // Add principal to request extensions
    request.extensions_mut().insert(principal);

    // Stamp a request id for correlation in the logs
    let request_id = logging::RequestId::new();
    tracing::debug!(request_id = %request_id, "Authenticated request");
    request.extensions_mut().insert(request_id);

    next.run(request).await
}

/// Creates a 401 response in the standard error envelope.
fn create_auth_error_response(message: &str) -> Response {
    let body = json!({
        "status": "error",
        "code": "UNAUTHORIZED",
        "message": message,
    });

    (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response()
}
