//! Command implementations.

pub mod cart;
pub mod catalog;
pub mod session;
pub mod theme;

use shopfront_core::{ProductIdError, SizeError};
use shopfront_storefront::StorefrontError;
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Invalid product id: {0}")]
    ProductId(#[from] ProductIdError),

    #[error("Invalid size: {0}")]
    Size(#[from] SizeError),

    #[error("Product not found: {0}")]
    ProductNotFound(String),
}
