//! Backend API client implementation.
//!
//! Uses `reqwest` for HTTP and decodes every reply through the shared
//! [`Envelope`].

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shopfront_core::{CartItems, Product, ProductId, Size};
use tracing::{debug, instrument};
use url::Url;

use super::ApiError;
use super::types::{
    Ack, AddToCartRequest, CartData, Envelope, ProductList, UNKNOWN_REJECTION, UpdateCartRequest,
};

/// Header carrying the session token.
const TOKEN_HEADER: &str = "token";

/// Longest body excerpt kept in logs and errors.
const BODY_EXCERPT: usize = 200;

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the shop backend API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &Url) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the enveloped reply.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let body = excerpt(&response_text);
            tracing::error!(
                status = %status,
                body = %body,
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<T> = match serde_json::from_str(&response_text) {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %excerpt(&response_text),
                    "Failed to parse backend response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| UNKNOWN_REJECTION.to_string());
            debug!(message = %message, "Backend rejected request");
            return Err(ApiError::Rejected(message));
        }

        Ok(envelope.body)
    }

    /// POST a JSON body with the session token header.
    async fn post_with_token<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self
            .inner
            .client
            .post(self.endpoint(path))
            .header(TOKEN_HEADER, token.expose_secret())
            .json(body);
        self.execute(request).await
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Fetch the full product list in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports
    /// `success: false`.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.inner.client.get(self.endpoint("/api/product/list"));
        let list: ProductList = self.execute(request).await?;
        debug!(count = list.products.len(), "Fetched product list");
        Ok(list.products)
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Record one more unit of `(item_id, size)` in the remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip_all, fields(item_id = %item_id, size = %size))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        item_id: &ProductId,
        size: &Size,
    ) -> Result<(), ApiError> {
        let body = AddToCartRequest {
            item_id: item_id.clone(),
            size: size.clone(),
        };
        let _: Ack = self.post_with_token("/api/cart/add", token, &body).await?;
        Ok(())
    }

    /// Set the remote quantity of `(item_id, size)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip_all, fields(item_id = %item_id, size = %size))]
    pub async fn update_cart(
        &self,
        token: &SecretString,
        item_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = UpdateCartRequest {
            item_id: item_id.clone(),
            size: size.clone(),
            quantity,
        };
        let _: Ack = self
            .post_with_token("/api/cart/update", token, &body)
            .await?;
        Ok(())
    }

    /// Fetch the authoritative remote cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &SecretString) -> Result<CartItems, ApiError> {
        let data: CartData = self
            .post_with_token("/api/cart/get", token, &serde_json::json!({}))
            .await?;
        Ok(data.cart_data)
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}
