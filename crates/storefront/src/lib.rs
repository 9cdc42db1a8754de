//! Shopfront Storefront library.
//!
//! Client-side state for a storefront talking to a JSON shop backend:
//! the product catalog, the cart with its backend mirror, promo codes,
//! and the session token that ties the cart to a signed-in shopper.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_storefront::{config::StorefrontConfig, state::ShopState};
//!
//! let state = ShopState::open(StorefrontConfig::from_env()?)?;
//! state.start().await;
//!
//! let product = state.catalog().products()[0].id.clone();
//! if let Some(mirror) = state.add_to_cart(&product, Some("M"))? {
//!     mirror.wait().await;
//! }
//! println!("{} items, {}", state.cart_count(), state.cart_amount());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod state;
pub mod storage;

pub use error::{Result, StorefrontError};
pub use state::{ShopState, SyncHandle};
