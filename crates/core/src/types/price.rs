//! Decimal money helpers and discount percentages.
//!
//! Prices are currency-agnostic decimals; the currency symbol is a display
//! concern supplied by configuration.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a discount percentage is out of range.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("discount must be between 0 and 100 percent (got {0})")]
pub struct DiscountPercentError(pub u32);

/// A whole-number discount percentage in `0..=100`.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopfront_core::DiscountPercent;
///
/// let ten = DiscountPercent::new(10).unwrap();
/// assert_eq!(ten.apply(Decimal::from(200)), Decimal::from(180));
/// assert!(DiscountPercent::new(101).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// No discount.
    pub const ZERO: Self = Self(0);

    /// Create a discount percentage.
    ///
    /// # Errors
    ///
    /// Returns an error if `percent` exceeds 100.
    pub fn new(percent: u32) -> Result<Self, DiscountPercentError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Self)
            .ok_or(DiscountPercentError(percent))
    }

    /// Create a discount from a `u8`, saturating at 100.
    #[must_use]
    pub const fn saturating(percent: u8) -> Self {
        if percent > 100 { Self(100) } else { Self(percent) }
    }

    /// The percentage as an integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether this is a zero discount.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Scale `amount` by `(1 - percent / 100)`.
    ///
    /// A zero discount returns `amount` unchanged. The deducted part is never
    /// larger than `amount`, so this cannot overflow.
    #[must_use]
    pub fn apply(self, amount: Decimal) -> Decimal {
        if self.is_zero() {
            return amount;
        }
        amount - amount * Decimal::new(i64::from(self.0), 2)
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u32> for DiscountPercent {
    type Error = DiscountPercentError;

    fn try_from(percent: u32) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<DiscountPercent> for u32 {
    fn from(percent: DiscountPercent) -> Self {
        Self::from(percent.0)
    }
}

/// Format an amount for display with a currency symbol and two decimals.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopfront_core::format_amount;
///
/// assert_eq!(format_amount("Rs.", Decimal::new(1805, 1)), "Rs.180.50");
/// ```
#[must_use]
pub fn format_amount(currency: &str, amount: Decimal) -> String {
    format!("{currency}{:.2}", amount.round_dp(2))
}
