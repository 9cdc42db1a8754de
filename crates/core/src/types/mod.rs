//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for the storefront domain.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;
pub mod promo;

pub use cart::{CartError, CartItems, CartLine, CartTotals};
pub use id::{ProductId, ProductIdError, Size, SizeError};
pub use price::{DiscountPercent, DiscountPercentError, format_amount};
pub use product::{Product, ProductQuery, ProductSort};
pub use promo::{PromoError, PromoRegistry};
