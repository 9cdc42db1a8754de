//! Cart contents and totals.
//!
//! The cart is a map from product id to a map from size to quantity. Stored
//! quantities are always at least one; an absent entry means zero.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{ProductId, Size, SizeError};
use super::product::Product;

/// Errors raised by cart mutations that fail validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// No size was selected.
    #[error("Select Product Size")]
    InvalidSize(#[from] SizeError),
    /// The `(product, size)` line is not in the cart.
    #[error("{product_id} in size {size} is not in the cart")]
    MissingLine {
        /// Product of the missing line.
        product_id: ProductId,
        /// Size of the missing line.
        size: Size,
    },
}

type RawCart = BTreeMap<ProductId, BTreeMap<Size, u32>>;

/// Cart contents keyed by product and size.
///
/// Serializes to the backend `cartData` shape:
/// `{ "<productId>": { "<size>": <quantity> } }`. Zero quantities in
/// incoming data are dropped.
///
/// ```
/// use shopfront_core::{CartItems, ProductId, Size};
///
/// let mut cart = CartItems::default();
/// let tee = ProductId::parse("p1").unwrap();
/// cart.add_one(tee.clone(), Size::parse("M").unwrap());
/// cart.add_one(tee, Size::parse("M").unwrap());
/// assert_eq!(cart.count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCart", into = "RawCart")]
pub struct CartItems {
    items: RawCart,
}

impl From<RawCart> for CartItems {
    fn from(mut items: RawCart) -> Self {
        for sizes in items.values_mut() {
            sizes.retain(|_, qty| *qty > 0);
        }
        items.retain(|_, sizes| !sizes.is_empty());
        Self { items }
    }
}

impl From<CartItems> for RawCart {
    fn from(cart: CartItems) -> Self {
        cart.items
    }
}

impl CartItems {
    /// Increment the quantity of `(product_id, size)` by one, creating the
    /// line if needed. Returns the new quantity.
    pub fn add_one(&mut self, product_id: ProductId, size: Size) -> u32 {
        let qty = self
            .items
            .entry(product_id)
            .or_default()
            .entry(size)
            .or_insert(0);
        *qty = qty.saturating_add(1);
        *qty
    }

    /// Set the quantity of an existing line. A quantity of zero removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::MissingLine`] if the line is not in the cart; the
    /// cart is left untouched.
    pub fn set_quantity(
        &mut self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<(), CartError> {
        let missing = || CartError::MissingLine {
            product_id: product_id.clone(),
            size: size.clone(),
        };
        let sizes = self.items.get_mut(product_id).ok_or_else(missing)?;
        let qty = sizes.get_mut(size).ok_or_else(missing)?;

        if quantity > 0 {
            *qty = quantity;
            return Ok(());
        }

        sizes.remove(size);
        if sizes.is_empty() {
            self.items.remove(product_id);
        }
        Ok(())
    }

    /// Quantity of `(product_id, size)`, zero when absent.
    #[must_use]
    pub fn quantity(&self, product_id: &ProductId, size: &Size) -> u32 {
        self.items
            .get(product_id)
            .and_then(|sizes| sizes.get(size))
            .copied()
            .unwrap_or(0)
    }

    /// Total number of units across all products and sizes.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items
            .values()
            .flat_map(BTreeMap::values)
            .map(|qty| u64::from(*qty))
            .sum()
    }

    /// Undiscounted sum of `price * quantity`, saturating at the bounds of
    /// [`Decimal`].
    ///
    /// Products for which `price_of` returns `None` are skipped.
    #[must_use]
    pub fn subtotal(&self, price_of: impl Fn(&ProductId) -> Option<Decimal>) -> Decimal {
        self.items
            .iter()
            .filter_map(|(id, sizes)| price_of(id).map(|price| (price, sizes)))
            .flat_map(|(price, sizes)| {
                sizes
                    .values()
                    .map(move |qty| price.saturating_mul(Decimal::from(*qty)))
            })
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Iterate over `(product, size, quantity)` lines in id order.
    pub fn lines(&self) -> impl Iterator<Item = (&ProductId, &Size, u32)> {
        self.items
            .iter()
            .flat_map(|(id, sizes)| sizes.iter().map(move |(size, qty)| (id, size, *qty)))
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// A cart line joined with its catalog product.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub size: Size,
    pub quantity: u32,
}

impl CartLine {
    /// `price * quantity`, before any discount. Saturates on overflow.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Checkout totals shown on the cart and place-order views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    /// Cart amount after discount.
    pub subtotal: Decimal,
    /// Delivery fee, zero for an empty subtotal.
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals from a (discounted) subtotal and the delivery fee.
    #[must_use]
    pub fn new(subtotal: Decimal, delivery_fee: Decimal) -> Self {
        let shipping = if subtotal.is_zero() {
            Decimal::ZERO
        } else {
            delivery_fee
        };
        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn id(s: &str) -> ProductId {
        ProductId::parse(s).unwrap()
    }

    fn size(s: &str) -> Size {
        Size::parse(s).unwrap()
    }

    #[test]
    fn test_count_matches_number_of_adds() {
        let mut cart = CartItems::default();
        let adds = [("p1", "M"), ("p1", "M"), ("p1", "L"), ("p2", "S"), ("p3", "XL")];
        for (p, s) in adds {
            cart.add_one(id(p), size(s));
        }
        assert_eq!(cart.count(), 5);
        assert_eq!(cart.quantity(&id("p1"), &size("M")), 2);
        assert_eq!(cart.quantity(&id("p9"), &size("M")), 0);
    }

    #[test]
    fn test_set_quantity_replaces_value() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        cart.set_quantity(&id("p1"), &size("M"), 7).unwrap();
        assert_eq!(cart.count(), 7);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        cart.add_one(id("p1"), size("L"));

        cart.set_quantity(&id("p1"), &size("M"), 0).unwrap();
        assert_eq!(cart.lines().count(), 1);

        cart.set_quantity(&id("p1"), &size("L"), 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        let before = cart.clone();

        let err = cart.set_quantity(&id("p1"), &size("S"), 3).unwrap_err();
        assert_eq!(
            err,
            CartError::MissingLine {
                product_id: id("p1"),
                size: size("S"),
            }
        );
        assert!(cart.set_quantity(&id("p2"), &size("M"), 1).is_err());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_subtotal_skips_unknown_products() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        cart.add_one(id("p1"), size("M"));
        cart.add_one(id("gone"), size("M"));

        let subtotal = cart.subtotal(|pid| (pid.as_str() == "p1").then(|| Decimal::from(100)));
        assert_eq!(subtotal, Decimal::from(200));
    }

    #[test]
    fn test_deserialize_drops_zero_quantities() {
        let cart: CartItems =
            serde_json::from_str(r#"{"p1": {"M": 2, "L": 0}, "p2": {"S": 0}}"#).unwrap();
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.lines().count(), 1);
    }

    #[test]
    fn test_serializes_as_cart_data() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json, serde_json::json!({"p1": {"M": 1}}));
    }

    #[test]
    fn test_totals_skip_shipping_for_empty_cart() {
        let empty = CartTotals::new(Decimal::ZERO, Decimal::from(10));
        assert_eq!(empty.total, Decimal::ZERO);

        let totals = CartTotals::new(Decimal::from(180), Decimal::from(10));
        assert_eq!(totals.shipping, Decimal::from(10));
        assert_eq!(totals.total, Decimal::from(190));
    }

    #[test]
    fn test_huge_prices_saturate() {
        let mut cart = CartItems::default();
        cart.add_one(id("p1"), size("M"));
        cart.add_one(id("p1"), size("M"));
        cart.add_one(id("p2"), size("M"));

        let price = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let subtotal = cart.subtotal(|_| Some(price));
        assert_eq!(subtotal, Decimal::MAX);

        let totals = CartTotals::new(subtotal, Decimal::from(10));
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_line_total_saturates() {
        let line = CartLine {
            product: Product {
                id: id("p1"),
                name: String::new(),
                description: String::new(),
                price: Decimal::MAX,
                images: Vec::new(),
                category: String::new(),
                sub_category: String::new(),
                sizes: Vec::new(),
                bestseller: false,
                date: 0,
            },
            size: size("M"),
            quantity: 3,
        };
        assert_eq!(line.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_invalid_size_message() {
        let err = CartError::from(SizeError);
        assert_eq!(err.to_string(), "Select Product Size");
    }
}
