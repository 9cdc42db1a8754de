//! Application state shared by every view.
//!
//! [`ShopState`] is the explicit state object handed to whatever renders the
//! storefront. It owns the product catalog, the cart, the applied promo code
//! and the session token, each held in a `tokio::sync::watch` channel so
//! views can subscribe to changes instead of polling.
//!
//! # Consistency model
//!
//! Local mutations are applied synchronously, in call order. When a session
//! token is present, cart mutations are mirrored to the backend on a spawned
//! task; a failed mirror is reported but never rolled back. A cart sync
//! replaces the local cart wholesale with whatever the backend returns.
//!
//! All spawning methods must be called from within a Tokio runtime.

mod cart;
mod catalog;
mod promo;
mod session;

pub use catalog::Catalog;
pub use promo::{AppliedPromo, PromoOutcome, PromoState};
pub use session::SessionState;

use std::future::Future;
use std::sync::Arc;

use shopfront_core::CartItems;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::{ApiError, BackendClient};
use crate::config::StorefrontConfig;
use crate::error::StorefrontError;
use crate::notify::Notifier;
use crate::storage::{LocalStorage, StorageError};

/// Handle to a spawned backend mirror or cart sync.
///
/// Dropping the handle detaches the task; awaiting [`SyncHandle::wait`]
/// blocks until it has finished and its effects are visible.
#[derive(Debug)]
pub struct SyncHandle(JoinHandle<()>);

impl SyncHandle {
    fn spawn(task: impl Future<Output = ()> + Send + 'static) -> Self {
        Self(tokio::spawn(task))
    }

    /// Wait for the task to finish.
    pub async fn wait(self) {
        if let Err(e) = self.0.await {
            tracing::error!(error = %e, "Background sync task failed");
        }
    }

    /// Whether the task has already finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

/// Storefront state shared across all views.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct ShopState {
    inner: Arc<ShopStateInner>,
}

struct ShopStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    storage: LocalStorage,
    notifier: Notifier,
    catalog: watch::Sender<Catalog>,
    cart: watch::Sender<CartItems>,
    promo: PromoState,
    session: SessionState,
}

impl std::fmt::Debug for ShopState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopState")
            .field("backend", &self.inner.backend)
            .field("signed_in", &self.inner.session.is_signed_in())
            .field("cart_count", &self.cart_count())
            .finish_non_exhaustive()
    }
}

impl ShopState {
    /// Create the state with `storage` as durable client storage.
    ///
    /// The cart starts from the storage mirror; the catalog starts empty and
    /// no session is adopted until [`ShopState::restore_session`] runs.
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: LocalStorage) -> Self {
        let backend = BackendClient::new(&config.backend_url);
        let notifier = Notifier::new();
        let promo = PromoState::new(config.promo_codes.clone(), notifier.clone());
        let cart = watch::Sender::new(storage.cart());

        Self {
            inner: Arc::new(ShopStateInner {
                config,
                backend,
                storage,
                notifier,
                catalog: watch::Sender::new(Catalog::default()),
                cart,
                promo,
                session: SessionState::new(),
            }),
        }
    }

    /// Create the state with storage opened from `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file exists but cannot be read.
    pub fn open(config: StorefrontConfig) -> Result<Self, StorageError> {
        let storage = LocalStorage::open(&config.storage_path)?;
        Ok(Self::new(config, storage))
    }

    /// Load the catalog and adopt any stored session, waiting for both.
    ///
    /// Failures are reported through notifications; the state stays usable.
    pub async fn start(&self) {
        let (_, sync) = tokio::join!(self.load_catalog(), async { self.restore_session() });
        if let Some(sync) = sync {
            sync.wait().await;
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the durable client storage.
    #[must_use]
    pub fn storage(&self) -> &LocalStorage {
        &self.inner.storage
    }

    /// Get a reference to the notification surface.
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Get a reference to the promo state holder.
    #[must_use]
    pub fn promo(&self) -> &PromoState {
        &self.inner.promo
    }

    /// Get a reference to the session token holder.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.inner.session
    }

    /// Whether dark mode is on.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.inner.storage.dark_mode()
    }

    /// Persist the dark mode preference.
    ///
    /// # Errors
    ///
    /// Returns an error if client storage cannot be written.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorefrontError> {
        self.inner.storage.set_dark_mode(enabled)?;
        Ok(())
    }

    /// Run `request` on a spawned task, reporting its failure.
    fn spawn_mirror(
        &self,
        request: impl Future<Output = Result<(), ApiError>> + Send + 'static,
    ) -> SyncHandle {
        let notifier = self.inner.notifier.clone();
        SyncHandle::spawn(async move {
            if let Err(e) = request.await {
                notifier.error(e.to_string());
                StorefrontError::from(e).report();
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use url::Url;

    use super::*;

    /// State pointed at a backend that is never contacted.
    pub fn offline_state() -> ShopState {
        let url = Url::parse("http://127.0.0.1:9").unwrap();
        ShopState::new(StorefrontConfig::for_backend(url), LocalStorage::in_memory())
    }
}
