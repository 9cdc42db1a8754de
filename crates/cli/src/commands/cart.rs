//! Cart commands.
//!
//! Each command first loads the catalog and adopts the stored session, so a
//! signed-in shopper sees the backend cart and every change is mirrored.
//!
//! # Usage
//!
//! ```bash
//! shopfront cart add 66a1f0 --size M
//! shopfront cart update 66a1f0 M 0
//! shopfront cart show --promo NEWUSER20
//! ```

use shopfront_core::{ProductId, Size};
use shopfront_storefront::{ShopState, SyncHandle};

use super::CommandError;
use crate::output;

/// Show the cart, optionally after applying a promo code.
pub async fn show(state: &ShopState, promo: Option<&str>) -> Result<(), CommandError> {
    state.start().await;

    if let Some(code) = promo {
        state.apply_promo_code(code);
    }

    let lines = state.cart_lines();
    let listed: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
    let unlisted = state.cart_count().saturating_sub(listed);

    output::cart(
        &state.config().currency,
        &lines,
        unlisted,
        &state.cart_totals(),
    );
    Ok(())
}

/// Add one unit of a product in `size`.
pub async fn add(state: &ShopState, id: &str, size: Option<&str>) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    state.start().await;

    let catalog = state.catalog();
    if let (Some(product), Some(size)) = (catalog.find(&id), size)
        && !product.offers_size(size.trim())
    {
        tracing::warn!(product = %id, size, "Size is not offered for this product");
    }

    let mirror = state.add_to_cart(&id, size)?;
    finish(mirror).await;

    output::line(&format!("Added to cart ({} items)", state.cart_count()));
    Ok(())
}

/// Set the quantity of an existing cart line.
pub async fn update(
    state: &ShopState,
    id: &str,
    size: &str,
    quantity: u32,
) -> Result<(), CommandError> {
    let id = ProductId::parse(id)?;
    let size = Size::parse(size)?;
    state.start().await;

    let mirror = state.update_quantity(&id, &size, quantity)?;
    finish(mirror).await;

    if quantity == 0 {
        output::line("Removed from cart");
    } else {
        output::line(&format!("Updated cart ({} items)", state.cart_count()));
    }
    Ok(())
}

/// Wait for the backend mirror so the process does not exit mid-request.
async fn finish(mirror: Option<SyncHandle>) {
    if let Some(mirror) = mirror {
        mirror.wait().await;
    }
}
