//! Durable client storage.
//!
//! A small JSON key-value file holding what a browser would keep in local
//! storage: the session `token`, the `darkMode` preference, and a mirror of
//! the cart. The cart mirror is a convenience for offline sessions and is
//! never authoritative: a signed-in session always replaces it with the
//! backend cart.
//!
//! Writes go to a sibling temp file that is then renamed over the target,
//! so a crash never leaves a half-written file behind.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use shopfront_core::CartItems;
use thiserror::Error;

/// Errors that can occur while reading or writing client storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the storage file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Encoding the storage file failed.
    #[error("Failed to encode storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default)]
    dark_mode: bool,
    #[serde(default, skip_serializing_if = "CartItems::is_empty")]
    cart: CartItems,
}

/// Key-value client storage backed by a JSON file, or by memory only.
#[derive(Debug)]
pub struct LocalStorage {
    path: Option<PathBuf>,
    state: Mutex<StoredState>,
}

impl LocalStorage {
    /// Open the storage file at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and replaced on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Client storage is corrupt, starting fresh"
                );
                StoredState::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => StoredState::default(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        Ok(Self {
            path: Some(path),
            state: Mutex::new(state),
        })
    }

    /// Storage that lives only as long as this value.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(StoredState::default()),
        }
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, StoredState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and write the result through to disk.
    fn update(&self, change: impl FnOnce(&mut StoredState)) -> Result<(), StorageError> {
        let mut state = self.lock();
        change(&mut state);
        self.persist(&state)
    }

    fn persist(&self, state: &StoredState) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let encoded = serde_json::to_vec_pretty(state)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, encoded).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    // =========================================================================
    // Token
    // =========================================================================

    /// The stored session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.lock()
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Store the session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_token(&self, token: &SecretString) -> Result<(), StorageError> {
        let token = token.expose_secret().to_string();
        self.update(|s| s.token = Some(token))
    }

    /// Forget the session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove_token(&self) -> Result<(), StorageError> {
        self.update(|s| s.token = None)
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    /// Whether dark mode is on.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.lock().dark_mode
    }

    /// Set the dark mode preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.update(|s| s.dark_mode = enabled)
    }

    // =========================================================================
    // Cart mirror
    // =========================================================================

    /// The last mirrored cart.
    #[must_use]
    pub fn cart(&self) -> CartItems {
        self.lock().cart.clone()
    }

    /// Mirror the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn set_cart(&self, cart: &CartItems) -> Result<(), StorageError> {
        let cart = cart.clone();
        self.update(|s| s.cart = cart)
    }

    /// Mirror the cart returned by `snapshot`, taken while the storage lock
    /// is held.
    ///
    /// Concurrent writers are serialized, so the last write always carries a
    /// snapshot at least as new as every earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn mirror_cart(&self, snapshot: impl FnOnce() -> CartItems) -> Result<(), StorageError> {
        self.update(|s| s.cart = snapshot())
    }
}
