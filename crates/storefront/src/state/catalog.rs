//! Product catalog snapshot and loader.

use std::sync::Arc;

use shopfront_core::{Product, ProductId, ProductQuery};
use tokio::sync::watch;
use tracing::instrument;

use crate::error::StorefrontError;

use super::ShopState;

/// Immutable snapshot of the product listings, newest first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<[Product]>,
}

impl Catalog {
    /// Build a snapshot from products in backend order.
    ///
    /// The backend lists oldest first; the snapshot stores them reversed so
    /// the most recently added product comes first.
    #[must_use]
    pub fn from_backend(mut products: Vec<Product>) -> Self {
        products.reverse();
        Self {
            products: products.into(),
        }
    }

    /// All products, newest first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// The `limit` newest products.
    #[must_use]
    pub fn latest(&self, limit: usize) -> &[Product] {
        self.products.get(..limit.min(self.len())).unwrap_or_default()
    }

    /// Up to `limit` bestsellers in catalog order.
    #[must_use]
    pub fn bestsellers(&self, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.bestseller)
            .take(limit)
            .collect()
    }

    /// Products matching a collection query.
    #[must_use]
    pub fn query(&self, query: &ProductQuery) -> Vec<&Product> {
        query.apply(&self.products)
    }

    /// Up to `limit` products sharing `product`'s category and sub-category.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| {
                p.id != product.id
                    && p.category == product.category
                    && p.sub_category == product.sub_category
            })
            .take(limit)
            .collect()
    }
}

impl ShopState {
    /// Fetch the product list and replace the catalog.
    ///
    /// On failure the previous snapshot is kept and the error is reported
    /// through a notification.
    ///
    /// # Errors
    ///
    /// Returns the backend error after reporting it.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<(), StorefrontError> {
        match self.backend().list_products().await {
            Ok(products) => {
                let catalog = Catalog::from_backend(products);
                tracing::info!(count = catalog.len(), "Catalog loaded");
                self.inner.catalog.send_replace(catalog);
                Ok(())
            }
            Err(e) => {
                self.notifier().error(e.to_string());
                let err = StorefrontError::from(e);
                err.report();
                Err(err)
            }
        }
    }

    /// The current catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        self.inner.catalog.borrow().clone()
    }

    /// Subscribe to catalog replacements.
    #[must_use]
    pub fn subscribe_catalog(&self) -> watch::Receiver<Catalog> {
        self.inner.catalog.subscribe()
    }

    /// Replace the catalog without contacting the backend.
    pub fn set_catalog(&self, catalog: Catalog) {
        self.inner.catalog.send_replace(catalog);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str, price: i64, bestseller: bool) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: format!("Product {id}"),
            description: String::new(),
            price: Decimal::from(price),
            images: Vec::new(),
            category: "Men".to_string(),
            sub_category: "Topwear".to_string(),
            sizes: vec!["M".to_string()],
            bestseller,
            date: 0,
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_backend(vec![
            product("old", 10, true),
            product("mid", 20, false),
            product("new", 30, true),
        ])
    }

    #[test]
    fn test_from_backend_reverses_order() {
        let ids: Vec<_> = catalog().products().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_find() {
        let catalog = catalog();
        let id = ProductId::parse("mid").unwrap();
        assert_eq!(catalog.find(&id).unwrap().price, Decimal::from(20));
        assert!(catalog.find(&ProductId::parse("nope").unwrap()).is_none());
    }

    #[test]
    fn test_latest_is_bounded() {
        let catalog = catalog();
        assert_eq!(catalog.latest(2).len(), 2);
        assert_eq!(catalog.latest(10).len(), 3);
        assert!(Catalog::default().latest(5).is_empty());
    }

    #[test]
    fn test_bestsellers() {
        let best = catalog();
        let best = best.bestsellers(5);
        assert_eq!(best.len(), 2);
        assert_eq!(best[0].id.as_str(), "new");
    }

    #[test]
    fn test_related_excludes_self() {
        let catalog = catalog();
        let subject = catalog.products()[0].clone();
        let related = catalog.related(&subject, 5);
        assert_eq!(related.len(), 2);
        assert!(related.iter().all(|p| p.id != subject.id));
    }

    #[test]
    fn test_set_catalog_notifies_subscribers() {
        let state = super::super::test_support::offline_state();
        let mut rx = state.subscribe_catalog();
        state.set_catalog(catalog());
        assert!(rx.has_changed().unwrap());
        assert_eq!(state.catalog().len(), 3);
    }
}
