//! Session token holder.
//!
//! The token gates backend mirroring of the cart. Adopting a new token
//! always triggers a cart sync; clearing it does not touch the backend.

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::instrument;

use crate::error::StorefrontError;

use super::{ShopState, SyncHandle};

/// Holds the session token. Empty means signed out.
#[derive(Debug)]
pub struct SessionState {
    token: watch::Sender<Option<SecretString>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Create a signed-out holder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: watch::Sender::new(None),
        }
    }

    /// The current token.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.token.borrow().clone()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Subscribe to token changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SecretString>> {
        self.token.subscribe()
    }

    /// Store `token`, returning whether it differs from the held one.
    ///
    /// An empty token clears the holder.
    fn replace(&self, token: Option<SecretString>) -> bool {
        let token = token.filter(|t| !t.expose_secret().is_empty());
        self.token.send_if_modified(|held| {
            let same = match (held.as_ref(), token.as_ref()) {
                (Some(a), Some(b)) => a.expose_secret() == b.expose_secret(),
                (None, None) => true,
                _ => false,
            };
            if !same {
                held.clone_from(&token);
            }
            !same
        })
    }
}

impl ShopState {
    /// Set the session token.
    ///
    /// Changing to a non-empty token starts a cart sync and returns its
    /// handle. Setting the held token again, or an empty one, does not sync.
    #[instrument(skip_all)]
    pub fn set_token(&self, token: SecretString) -> Option<SyncHandle> {
        let changed = self.session().replace(Some(token));
        let token = self.session().token()?;
        if !changed {
            return None;
        }
        tracing::info!("Session token changed, syncing cart");
        Some(self.sync_cart(token))
    }

    /// Adopt a token from durable storage when none is held yet.
    pub fn restore_session(&self) -> Option<SyncHandle> {
        if self.session().is_signed_in() {
            return None;
        }
        let stored = self.storage().token()?;
        tracing::info!("Restoring session from client storage");
        self.set_token(stored)
    }

    /// Sign in with `token`: persist it, then adopt it.
    ///
    /// # Errors
    ///
    /// Returns an error if client storage cannot be written; the token is
    /// still adopted for this session.
    pub fn login(&self, token: SecretString) -> Result<Option<SyncHandle>, StorefrontError> {
        let persisted = self.storage().set_token(&token);
        let sync = self.set_token(token);
        persisted?;
        Ok(sync)
    }

    /// Sign out: forget the token everywhere and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if client storage cannot be written; the in-memory
    /// state is signed out regardless.
    pub fn logout(&self) -> Result<(), StorefrontError> {
        self.session().replace(None);
        self.clear_cart();
        self.storage().remove_token()?;
        tracing::info!("Signed out");
        Ok(())
    }
}
