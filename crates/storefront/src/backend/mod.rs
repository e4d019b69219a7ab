//! Commerce REST API client.
//!
//! # Architecture
//!
//! - The commerce API is the source of truth - NO local sync, direct calls
//! - Typed request and response structs from `fortynine-core`
//! - In-memory caching via `moka` for slow-changing data (5 minute TTL)
//!
//! # Authentication
//!
//! Customer-scoped endpoints (cart, orders, addresses, wishlist) require a
//! bearer token. The storefront obtains the token at login, keeps it in the
//! server-side session, and replays it on each call. Catalog and location
//! reads are public.

mod cache;
mod client;

pub use client::{ApiClient, ProductQuery, ProductSort, SortOrder};

use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bearer token missing, expired, or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl ApiError {
    /// Whether this error means the stored bearer token is no longer valid
    /// and the customer should log in again.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 664f1a".to_string());
        assert_eq!(err.to_string(), "Not found: product 664f1a");

        let err = ApiError::Status {
            status: 409,
            message: "email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 409: email already registered");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ApiError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(ApiError::Unauthorized.is_auth_failure());
        assert!(!ApiError::NotFound("x".to_string()).is_auth_failure());
    }
}
