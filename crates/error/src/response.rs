//! # API Response Types
//!
//! Generic API response types for the Capstone application.
//! Provides a consistent response format for all API endpoints.
//!
//! ## Response Format
//!
//! ```json
//! {
//!   "status": "success",
//!   "data": { ... }
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page number (1-indexed).
    pub page: u64,

    /// Number of items per page.
    pub per_page: u64,

    /// Total number of items.
    pub total_items: u64,

    /// Total number of pages.
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Create a new pagination meta.
    ///
    /// `page` is clamped to at least 1.
    pub fn new(page: u64, per_page: u64, total_items: u64) -> Self {
        let page = page.max(1);
        let total_pages = if total_items == 0 {
            0
        }
        else {
            total_items.div_ceil(per_page.max(1))
        };
        Self {
            page,
            per_page,
            total_items,
            total_pages,
        }
    }

    /// Calculate the offset for database queries.
    pub fn offset(&self) -> u64 { (self.page - 1).saturating_mul(self.per_page) }

    /// Calculate the limit.
    pub fn limit(&self) -> u64 { self.per_page }
}

/// API response envelope.
///
/// This is the generic response type used for all API responses. It provides
/// a consistent format with a status tag, data, and error information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum ApiResponse<T> {
    /// Success response.
    #[serde(rename = "success")]
    Success {
        /// Response payload.
        data: T,
        /// Pagination info, when the payload is a page of a larger set.
        #[serde(skip_serializing_if = "Option::is_none")]
        pagination: Option<PaginationMeta>,
    },

    /// Error response.
    #[serde(rename = "error")]
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable error message.
        message: String,
    },
}

impl<T> ApiResponse<T> {
    /// Create a success response.
    pub fn ok(data: T) -> Self {
        Self::Success {
            data,
            pagination: None,
        }
    }

    /// Create a paginated success response.
    pub fn paginated(data: T, pagination: PaginationMeta) -> Self {
        Self::Success {
            data,
            pagination: Some(pagination),
        }
    }

    /// Create an error response.
    pub fn error(code: impl ToString, message: impl ToString) -> Self {
        Self::Error {
            code:    code.to_string(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serialization() {
        let response = ApiResponse::ok(serde_json::json!({"id": 1}));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["id"], 1);
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_error_serialization() {
        let response = ApiResponse::<()>::error("TEAM_FULL", "Team is already full");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "TEAM_FULL");
        assert_eq!(json["message"], "Team is already full");
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(2, 20, 45);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.offset(), 20);
        assert_eq!(meta.limit(), 20);
    }

    #[test]
    fn test_pagination_meta_empty() {
        let meta = PaginationMeta::new(1, 20, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.offset(), 0);
    }

    #[test]
    fn test_pagination_meta_page_clamp() {
        let meta = PaginationMeta::new(0, 20, 10);
        assert_eq!(meta.page, 1);
    }

    #[test]
    fn test_paginated_response() {
        let response = ApiResponse::paginated(vec![1, 2, 3], PaginationMeta::new(1, 3, 9));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["pagination"]["totalPages"], 3);
    }
}
