//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! shopfront products --search tee --category Men --category Kids
//! shopfront products --sort price-high-low --bestsellers
//! shopfront product 66a1f0
//! ```

use clap::ValueEnum;
use shopfront_core::{ProductId, ProductQuery, ProductSort};
use shopfront_storefront::ShopState;

use super::CommandError;
use crate::output;

/// Related products shown under a product.
const RELATED_LIMIT: usize = 5;

/// Sort order accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Relevant,
    PriceLowHigh,
    PriceHighLow,
}

impl From<SortArg> for ProductSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Relevant => Self::Relevant,
            SortArg::PriceLowHigh => Self::PriceLowHigh,
            SortArg::PriceHighLow => Self::PriceHighLow,
        }
    }
}

/// Filters for `shopfront products`.
#[derive(Debug, Clone)]
pub struct ProductsArgs {
    pub search: String,
    pub categories: Vec<String>,
    pub sub_categories: Vec<String>,
    pub sort: SortArg,
    pub bestsellers: bool,
}

impl ProductsArgs {
    fn query(&self) -> ProductQuery {
        ProductQuery {
            search: self.search.clone(),
            categories: self.categories.clone(),
            sub_categories: self.sub_categories.clone(),
            sort: self.sort.into(),
        }
    }
}

/// List products matching `args`.
pub async fn products(state: &ShopState, args: ProductsArgs) -> Result<(), CommandError> {
    state.load_catalog().await?;

    let catalog = state.catalog();
    let mut matched = catalog.query(&args.query());
    if args.bestsellers {
        matched.retain(|p| p.bestseller);
    }
    tracing::debug!(matched = matched.len(), total = catalog.len(), "Catalog query");

    output::product_list(&state.config().currency, &matched);
    Ok(())
}

/// Show one product and the products related to it.
pub async fn product(state: &ShopState, id: &str) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    state.load_catalog().await?;

    let catalog = state.catalog();
    let product = catalog
        .find(&id)
        .ok_or_else(|| CommandError::ProductNotFound(id.to_string()))?;

    let currency = &state.config().currency;
    output::product_detail(currency, product);

    let related = catalog.related(product, RELATED_LIMIT);
    if !related.is_empty() {
        output::line("");
        output::line("Related products:");
        output::product_list(currency, &related);
    }
    Ok(())
}
