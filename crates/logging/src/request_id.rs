//! # Request ID Tracking
//!
//! Utilities for generating and propagating request IDs across the
//! application. IDs are UUIDv4, rendered without hyphens so they stay
//! URL-safe and compact in log output.

/// A request correlation ID.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new random request ID.
    #[inline]
    pub fn new() -> Self { Self(uuid::Uuid::new_v4().simple().to_string()) }

    /// Get the request ID as a string.
    #[inline]
    pub fn as_str(&self) -> &str { &self.0 }

    /// Consume and return the inner string.
    #[inline]
    pub fn into_string(self) -> String { self.0 }

    /// Parse a request ID from an incoming header value.
    ///
    /// Accepts alphanumeric ids (plus `-`/`_`) of at least 16 characters;
    /// anything else is discarded so callers fall back to a fresh ID.
    pub fn try_from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() >= 16
            && value.len() <= 64
            && value
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            Some(Self(value.to_string()))
        }
        else {
            None
        }
    }
}

impl Default for RequestId {
    #[inline]
    fn default() -> Self { Self::new() }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_unique() {
        let a = RequestId::new();
        let b = RequestId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_try_from_header_valid() {
        let value = "a3f9c2d08b4e4f6a9c1d2e3f4a5b6c7d";
        let id = RequestId::try_from_header(value).unwrap();
        assert_eq!(id.as_str(), value);
    }

    #[test]
    fn test_try_from_header_rejects_garbage() {
        assert!(RequestId::try_from_header("short").is_none());
        assert!(RequestId::try_from_header("has spaces in the middle!").is_none());
    }
}
