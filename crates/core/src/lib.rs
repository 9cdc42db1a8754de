//! Shopfront Core - Shared domain types.
//!
//! This crate provides the types shared by every Shopfront component:
//! - `storefront` - Client state holders and backend API client
//! - `cli` - Terminal front-end over the storefront state
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no runtime. Cart arithmetic and promo lookups live here so they
//! can be tested without a backend.
//!
//! # Modules
//!
//! - [`types`] - Product ids, sizes, products, carts, promo codes and totals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
