//! Promo code state holder.

use serde::Serialize;
use shopfront_core::{DiscountPercent, PromoRegistry};
use tokio::sync::watch;

use crate::notify::Notifier;

use super::ShopState;

/// The promo code currently in effect.
///
/// `discount` is zero exactly when `code` is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppliedPromo {
    pub code: Option<String>,
    pub discount: DiscountPercent,
}

/// Result of applying a promo code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PromoOutcome {
    pub accepted: bool,
    pub discount: DiscountPercent,
}

/// Holds the applied promo code and validates new ones against the registry.
#[derive(Debug)]
pub struct PromoState {
    registry: PromoRegistry,
    applied: watch::Sender<AppliedPromo>,
    notifier: Notifier,
}

impl PromoState {
    /// Create a holder with nothing applied.
    #[must_use]
    pub fn new(registry: PromoRegistry, notifier: Notifier) -> Self {
        Self {
            registry,
            applied: watch::Sender::new(AppliedPromo::default()),
            notifier,
        }
    }

    /// Apply `code`.
    ///
    /// A registered code becomes active with its discount. Anything else
    /// clears the active code and resets the discount to zero.
    pub fn apply(&self, code: &str) -> PromoOutcome {
        match self.registry.lookup(code) {
            Some(discount) => {
                self.applied.send_replace(AppliedPromo {
                    code: Some(code.to_string()),
                    discount,
                });
                self.notifier
                    .success(format!("Promo code applied! {discount} off"));
                PromoOutcome {
                    accepted: true,
                    discount,
                }
            }
            None => {
                self.applied.send_replace(AppliedPromo::default());
                self.notifier.error("Invalid promo code");
                PromoOutcome {
                    accepted: false,
                    discount: DiscountPercent::ZERO,
                }
            }
        }
    }

    /// The active discount, zero when no code is applied.
    #[must_use]
    pub fn discount(&self) -> DiscountPercent {
        self.applied.borrow().discount
    }

    /// The active code, if any.
    #[must_use]
    pub fn active_code(&self) -> Option<String> {
        self.applied.borrow().code.clone()
    }

    /// Snapshot of the applied promo.
    #[must_use]
    pub fn applied(&self) -> AppliedPromo {
        self.applied.borrow().clone()
    }

    /// Subscribe to promo changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AppliedPromo> {
        self.applied.subscribe()
    }

    /// The registry codes are validated against.
    #[must_use]
    pub const fn registry(&self) -> &PromoRegistry {
        &self.registry
    }
}

impl ShopState {
    /// Apply a promo code to the cart amount.
    pub fn apply_promo_code(&self, code: &str) -> PromoOutcome {
        self.promo().apply(code)
    }
}

#[cfg(test)]
mod tests {
    use crate::notify::{NotificationLevel, drain};

    use super::*;

    fn holder() -> (PromoState, tokio::sync::broadcast::Receiver<crate::notify::Notification>) {
        let notifier = Notifier::new();
        let rx = notifier.subscribe();
        (PromoState::new(PromoRegistry::default(), notifier), rx)
    }

    #[test]
    fn test_valid_code_sets_discount() {
        let (promo, mut rx) = holder();
        let outcome = promo.apply("SAVE10");

        assert!(outcome.accepted);
        assert_eq!(outcome.discount.get(), 10);
        assert_eq!(promo.discount().get(), 10);
        assert_eq!(promo.active_code().as_deref(), Some("SAVE10"));

        let notes = drain(&mut rx);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes.first().map(|n| n.level), Some(NotificationLevel::Success));
        assert_eq!(
            notes.first().map(|n| n.message.as_str()),
            Some("Promo code applied! 10% off")
        );
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (promo, _rx) = holder();
        let once = promo.apply("NEWUSER20");
        let twice = promo.apply("NEWUSER20");
        assert_eq!(once, twice);
        assert_eq!(promo.discount().get(), 20);
    }

    #[test]
    fn test_unknown_code_resets_discount() {
        let (promo, mut rx) = holder();
        promo.apply("SAVE20");
        let outcome = promo.apply("BOGUS");

        assert!(!outcome.accepted);
        assert!(promo.discount().is_zero());
        assert!(promo.active_code().is_none());
        assert_eq!(
            drain(&mut rx).last().map(|n| n.message.clone()),
            Some("Invalid promo code".to_string())
        );
    }

    #[test]
    fn test_unknown_code_from_clean_state() {
        let (promo, _rx) = holder();
        assert_eq!(promo.apply("UNKNOWN").discount, DiscountPercent::ZERO);
        assert_eq!(promo.applied(), AppliedPromo::default());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (promo, _rx) = holder();
        let mut sub = promo.subscribe();
        promo.apply("DISCOUNT10");
        assert!(sub.has_changed().unwrap_or(false));
        assert_eq!(sub.borrow_and_update().discount.get(), 10);
    }
}
