//! # Error Response Conversion
//!
//! Converts [`AppError`] values into HTTP responses for the axum routing
//! layer. Business-rule rejections surface their message verbatim; server
//! faults are collapsed to a generic message so internals never leak.

use axum::{body::Body, http::StatusCode, response::Response};

use crate::{response::ApiResponse, AppError};

/// Error handler that converts errors to HTTP responses.
#[derive(Clone)]
pub struct ErrorHandler {
    /// Whether to include 5xx error details in the response body.
    pub include_details: bool,
}

impl ErrorHandler {
    /// Create a new error handler.
    #[inline]
    pub fn new(include_details: bool) -> Self {
        Self {
            include_details,
        }
    }

    /// Convert an error to a response.
    pub fn to_response(&self, err: &AppError) -> Response {
        let status = err.status();
        let code = err.code();
        let message = if status.is_server_error() && !self.include_details {
            "Internal server error".to_string()
        }
        else {
            err.message()
        };

        let response = ApiResponse::<()>::error(code, message);
        let body = serde_json::to_string(&response).unwrap_or_else(|_| {
            format!(r#"{{"status":"error","code":"{}","message":"serialization failure"}}"#, code)
        });

        Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap_or_else(|_| {
                let mut res = Response::new(Body::empty());
                *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                res
            })
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(code = self.code(), message = %self.message(), "Request failed");
        }
        ErrorHandler::new(false).to_response(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_handler_not_found() {
        let handler = ErrorHandler::new(false);
        let err = AppError::not_found("Team not found");
        let response = handler.to_response(&err);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_handler_conflict() {
        let handler = ErrorHandler::new(false);
        let err = AppError::team_full("Team is already full");
        let response = handler.to_response(&err);

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_error_handler_hides_internal_details() {
        let handler = ErrorHandler::new(false);
        let err = AppError::database("connection string leaked");
        let response = handler.to_response(&err);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_response_impl() {
        use axum::response::IntoResponse;

        let response = AppError::deadline_passed("Milestone deadline has passed").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
