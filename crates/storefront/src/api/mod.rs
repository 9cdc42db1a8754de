//! Shop backend API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`
//! - The backend is the source of truth for carts of signed-in users; the
//!   client only mirrors local changes and hydrates on sign-in
//! - Every response shares the `{ success, message? }` envelope
//!
//! # Endpoints
//!
//! | Method | Path                | Auth    | Used by              |
//! |--------|---------------------|---------|----------------------|
//! | GET    | `/api/product/list` | none    | catalog loader       |
//! | POST   | `/api/cart/add`     | `token` | add to cart mirror   |
//! | POST   | `/api/cart/update`  | `token` | quantity mirror      |
//! | POST   | `/api/cart/get`     | `token` | cart sync on sign-in |
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::api::BackendClient;
//!
//! let client = BackendClient::new(&config.backend_url);
//! let products = client.list_products().await?;
//! ```

mod client;
pub mod types;

pub use client::BackendClient;

use thiserror::Error;

/// Errors that can occur when talking to the shop backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status code.
    #[error("Request failed with status code {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading part of the response body.
        body: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend reported `success: false`.
    #[error("{0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether the backend understood the request but declined it.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 500,
            body: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_rejected_error_shows_server_message() {
        let err = ApiError::Rejected("Not Authorized Login Again".to_string());
        assert_eq!(err.to_string(), "Not Authorized Login Again");
        assert!(err.is_rejection());
    }
}
