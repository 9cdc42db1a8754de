//! Cart operations.
//!
//! Every mutation updates the local cart first, writes the storage mirror,
//! and then, when signed in, replays the same change against the backend.

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_core::{CartError, CartItems, CartLine, CartTotals, ProductId, Size};
use tokio::sync::watch;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{StorefrontError, add_breadcrumb};

use super::{ShopState, SyncHandle};

impl ShopState {
    /// Add one unit of `product_id` in the selected size.
    ///
    /// Returns the handle of the backend mirror when signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidSize`] when no size is selected; the cart
    /// is left untouched and an error notification is published.
    #[instrument(skip(self))]
    pub fn add_to_cart(
        &self,
        product_id: &ProductId,
        size: Option<&str>,
    ) -> Result<Option<SyncHandle>, StorefrontError> {
        let size = Size::from_selection(size)
            .map_err(CartError::from)
            .map_err(|e| self.reject(e))?;

        let mut quantity = 0;
        self.inner.cart.send_modify(|cart| {
            quantity = cart.add_one(product_id.clone(), size.clone());
        });
        tracing::debug!(quantity, "Added to cart");
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product_id.as_str()), ("size", size.as_str())]),
        );
        self.mirror_to_storage();

        let Some(token) = self.session().token() else {
            return Ok(None);
        };
        let backend = self.backend().clone();
        let product_id = product_id.clone();
        Ok(Some(self.spawn_mirror(async move {
            backend.add_to_cart(&token, &product_id, &size).await
        })))
    }

    /// Set the quantity of a line already in the cart. Zero removes it.
    ///
    /// Returns the handle of the backend mirror when signed in.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingLine`] when the line is not in the cart;
    /// nothing is mutated or sent and an error notification is published.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<Option<SyncHandle>, StorefrontError> {
        let mut outcome = Ok(());
        self.inner.cart.send_if_modified(|cart| {
            outcome = cart.set_quantity(product_id, size, quantity);
            outcome.is_ok()
        });
        outcome.map_err(|e| self.reject(e))?;
        self.mirror_to_storage();

        let Some(token) = self.session().token() else {
            return Ok(None);
        };
        let backend = self.backend().clone();
        let product_id = product_id.clone();
        let size = size.clone();
        Ok(Some(self.spawn_mirror(async move {
            backend
                .update_cart(&token, &product_id, &size, quantity)
                .await
        })))
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn cart_count(&self) -> u64 {
        self.inner.cart.borrow().count()
    }

    /// Cart amount after the active promo discount.
    ///
    /// Lines whose product is missing from the catalog are skipped.
    #[must_use]
    pub fn cart_amount(&self) -> Decimal {
        let catalog = self.catalog();
        let subtotal = self
            .inner
            .cart
            .borrow()
            .subtotal(|id| catalog.find(id).map(|p| p.price));
        self.promo().discount().apply(subtotal)
    }

    /// Checkout totals including the delivery fee.
    #[must_use]
    pub fn cart_totals(&self) -> CartTotals {
        CartTotals::new(self.cart_amount(), self.config().delivery_fee)
    }

    /// Cart lines joined with their catalog products, for display.
    #[must_use]
    pub fn cart_lines(&self) -> Vec<CartLine> {
        let catalog = self.catalog();
        self.inner
            .cart
            .borrow()
            .lines()
            .filter_map(|(id, size, quantity)| {
                catalog.find(id).map(|product| CartLine {
                    product: product.clone(),
                    size: size.clone(),
                    quantity,
                })
            })
            .collect()
    }

    /// Snapshot of the raw cart contents.
    #[must_use]
    pub fn cart_items(&self) -> CartItems {
        self.inner.cart.borrow().clone()
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe_cart(&self) -> watch::Receiver<CartItems> {
        self.inner.cart.subscribe()
    }

    /// Empty the local cart. The backend is not contacted.
    pub fn clear_cart(&self) {
        self.replace_cart(CartItems::default());
    }

    /// Fetch the backend cart for `token` and replace the local cart with it.
    ///
    /// Runs on a spawned task. A rejected request leaves the local cart as
    /// it was; a failed one is also reported through a notification.
    pub fn sync_cart(&self, token: SecretString) -> SyncHandle {
        let state = self.clone();
        SyncHandle::spawn(async move {
            match state.backend().get_cart(&token).await {
                Ok(cart) => {
                    tracing::info!(count = cart.count(), "Cart synced from backend");
                    state.inner.cart.send_replace(cart);
                    state.mirror_to_storage_blocking().await;
                }
                Err(e @ ApiError::Rejected(_)) => {
                    StorefrontError::from(e).report();
                }
                Err(e) => {
                    state.notifier().error(e.to_string());
                    StorefrontError::from(e).report();
                }
            }
        })
    }

    fn replace_cart(&self, cart: CartItems) {
        self.inner.cart.send_replace(cart);
        self.mirror_to_storage();
    }

    /// Publish a validation failure and wrap it.
    fn reject(&self, err: CartError) -> StorefrontError {
        self.notifier().error(err.to_string());
        let err = StorefrontError::from(err);
        err.report();
        err
    }

    /// Write the cart to client storage. Failures are only logged: the
    /// mirror is not authoritative.
    fn mirror_to_storage(&self) {
        if let Err(e) = self.storage().mirror_cart(|| self.cart_items()) {
            tracing::warn!(error = %e, "Failed to mirror cart to client storage");
        }
    }

    /// [`Self::mirror_to_storage`] on the blocking pool, for use from tasks.
    async fn mirror_to_storage_blocking(&self) {
        let state = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || state.mirror_to_storage()).await {
            tracing::error!(error = %e, "Cart storage mirror task failed");
        }
    }
}
