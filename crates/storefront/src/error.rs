//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` type for every state operation.
//! Remote and storage failures are captured to Sentry; validation errors
//! are user mistakes and only reach the notification surface.

use shopfront_core::CartError;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Cart input failed validation; nothing was mutated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Durable client storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl StorefrontError {
    /// Whether this error comes from bad user input.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Cart(_))
    }

    /// Log the error and capture it to Sentry unless it is a validation
    /// error or a backend rejection.
    pub fn report(&self) {
        match self {
            Self::Cart(_) => {
                tracing::debug!(error = %self, "Validation error");
            }
            Self::Api(err) if err.is_rejection() => {
                tracing::warn!(error = %self, "Backend rejected request");
            }
            Self::Api(_) | Self::Storage(_) => {
                let event_id = sentry::capture_error(self);
                tracing::error!(
                    error = %self,
                    sentry_event_id = %event_id,
                    "Storefront error"
                );
            }
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use shopfront_core::SizeError;

    use super::*;

    #[test]
    fn test_validation_error_display_is_user_facing() {
        let err = StorefrontError::from(CartError::from(SizeError));
        assert_eq!(err.to_string(), "Select Product Size");
        assert!(err.is_validation());
    }

    #[test]
    fn test_api_error_is_not_validation() {
        let err = StorefrontError::from(ApiError::Rejected("nope".to_string()));
        assert_eq!(err.to_string(), "nope");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_report_without_sentry_client_is_harmless() {
        StorefrontError::from(ApiError::Status {
            status: 502,
            body: String::new(),
        })
        .report();
    }
}
