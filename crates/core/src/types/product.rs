//! Product listings and collection queries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as listed by the shop backend.
///
/// Only `id` and `price` take part in cart arithmetic; the rest is display
/// metadata and defaults when the backend omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price, currency-agnostic.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URLs, first one is the thumbnail.
    #[serde(default, rename = "image")]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sub_category: String,
    /// Size labels offered for this product.
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub bestseller: bool,
    /// Listing timestamp in milliseconds since the epoch.
    #[serde(default)]
    pub date: i64,
}

impl Product {
    /// The thumbnail image, if any.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether `size` is one of this product's offered sizes.
    #[must_use]
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Sort order for collection listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Catalog order.
    #[default]
    Relevant,
    PriceLowHigh,
    PriceHighLow,
}

/// Filters applied to the catalog by the collection view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against product names. Ignored
    /// when blank.
    pub search: String,
    /// Keep products in any of these categories. Empty keeps all.
    pub categories: Vec<String>,
    /// Keep products in any of these sub-categories. Empty keeps all.
    pub sub_categories: Vec<String>,
    pub sort: ProductSort,
}

impl ProductQuery {
    /// Whether `product` passes the search and category filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.trim();
        if !search.is_empty()
            && !product
                .name
                .to_lowercase()
                .contains(&search.to_lowercase())
        {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if !self.sub_categories.is_empty() && !self.sub_categories.contains(&product.sub_category)
        {
            return false;
        }
        true
    }

    /// Filter and sort `products`, preserving catalog order for ties.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| self.matches(p)).collect();
        match self.sort {
            ProductSort::Relevant => {}
            ProductSort::PriceLowHigh => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            ProductSort::PriceHighLow => matched.sort_by(|a, b| b.price.cmp(&a.price)),
        }
        matched
    }
}
