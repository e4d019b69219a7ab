//! Commerce REST API client, admin surface.
//!
//! The admin panel talks to the same commerce backend as the storefront
//! but uses the staff-only endpoints: the full order listing, order
//! status updates, and location CRUD. Every call except login carries a
//! staff bearer token; the backend rejects tokens from non-admin
//! accounts. Nothing is cached here, so an edit is visible on the next
//! page load.

mod client;

pub use client::{AdminApiClient, OrderListQuery};

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

    /// Bearer token missing, expired, or not an admin token.
    #[error("Unauthorized")]
    Unauthorized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("order 664f1a".to_string());
        assert_eq!(err.to_string(), "Not found: order 664f1a");

        let err = ApiError::Status {
            status: 422,
            message: "postal codes must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API returned 422: postal codes must not be empty"
        );
    }
}
