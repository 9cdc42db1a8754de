//! Promo code registry.
//!
//! A fixed map from promo code to discount percentage. Lookups are exact
//! and case-sensitive.

use std::collections::BTreeMap;
use std::str::FromStr;

use super::price::{DiscountPercent, DiscountPercentError};

/// Errors that can occur when parsing a [`PromoRegistry`] definition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PromoError {
    /// An entry is not of the form `CODE=PERCENT`.
    #[error("malformed promo entry '{0}', expected CODE=PERCENT")]
    Malformed(String),
    /// The code part of an entry is blank.
    #[error("promo code cannot be empty")]
    EmptyCode,
    /// The percentage part is not an integer.
    #[error("invalid percentage for promo code {code}: {value}")]
    InvalidPercent {
        /// Code the percentage belongs to.
        code: String,
        /// Offending value.
        value: String,
    },
    /// The percentage is out of range.
    #[error("promo code {code}: {source}")]
    OutOfRange {
        /// Code the percentage belongs to.
        code: String,
        /// Range error.
        source: DiscountPercentError,
    },
}

/// The set of valid promo codes and their discounts.
///
/// ```
/// use shopfront_core::PromoRegistry;
///
/// let registry = PromoRegistry::default();
/// assert_eq!(registry.lookup("SAVE10").map(|d| d.get()), Some(10));
/// assert!(registry.lookup("save10").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoRegistry {
    codes: BTreeMap<String, DiscountPercent>,
}

impl PromoRegistry {
    /// The built-in codes.
    pub const DEFAULT_CODES: &[(&str, u8)] = &[
        ("SAVE10", 10),
        ("NEWUSER20", 20),
        ("DISCOUNT10", 10),
        ("SAVE20", 20),
    ];

    /// Create a registry from `(code, discount)` pairs.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = (String, DiscountPercent)>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
        }
    }

    /// Look up the discount for `code`.
    #[must_use]
    pub fn lookup(&self, code: &str) -> Option<DiscountPercent> {
        self.codes.get(code).copied()
    }

    /// Iterate over registered codes in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DiscountPercent)> {
        self.codes.iter().map(|(code, pct)| (code.as_str(), *pct))
    }

    /// Number of registered codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no codes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for PromoRegistry {
    fn default() -> Self {
        Self {
            codes: Self::DEFAULT_CODES
                .iter()
                .map(|(code, pct)| ((*code).to_string(), DiscountPercent::saturating(*pct)))
                .collect(),
        }
    }
}

/// Parses `CODE=PERCENT` entries separated by commas, e.g.
/// `SAVE10=10,NEWUSER20=20`. Surrounding whitespace is ignored and empty
/// entries are skipped.
impl FromStr for PromoRegistry {
    type Err = PromoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut codes = BTreeMap::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (code, value) = entry
                .split_once('=')
                .ok_or_else(|| PromoError::Malformed(entry.to_string()))?;
            let code = code.trim();
            let value = value.trim();
            if code.is_empty() {
                return Err(PromoError::EmptyCode);
            }
            let percent = value
                .parse::<u32>()
                .map_err(|_| PromoError::InvalidPercent {
                    code: code.to_string(),
                    value: value.to_string(),
                })?;
            let percent = DiscountPercent::new(percent).map_err(|source| PromoError::OutOfRange {
                code: code.to_string(),
                source,
            })?;
            codes.insert(code.to_string(), percent);
        }
        Ok(Self { codes })
    }
}
