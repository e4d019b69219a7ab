//! Cart totals and checkout eligibility.
//!
//! Pure arithmetic over cart lines. The storefront feeds it the cart as
//! fetched from the backend and renders whatever comes out; nothing here
//! performs I/O or mutates anything.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Rupees;

/// One line of a cart for totals purposes: a unit price snapshot and a
/// quantity. Everything else about the product is irrelevant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    /// Unit price at the time the item entered the cart.
    pub unit_price: Decimal,
    /// Number of units. Zero-quantity lines contribute nothing.
    pub quantity: u32,
}

impl CartLine {
    /// Create a cart line.
    #[must_use]
    pub const fn new(unit_price: Decimal, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    fn line_total(self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Store-wide pricing knobs, loaded from configuration at startup.
///
/// Flat shipping and taxes are added to every order; the minimum-order
/// threshold gates checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Flat delivery charge per order.
    pub shipping: Rupees,
    /// Flat tax charge per order.
    pub taxes: Rupees,
    /// Smallest order total accepted at checkout.
    pub minimum_order: Rupees,
}

/// Aggregated cart figures, computed once per request and carried into
/// views and the checkout pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of unit price times quantity over all lines.
    pub subtotal: Decimal,
    /// Sum of quantities over all lines.
    pub item_count: u32,
    /// Subtotal plus shipping plus taxes, rounded up to whole rupees.
    pub total: Rupees,
}

impl CartTotals {
    /// Compute totals for a set of cart lines under a pricing policy.
    ///
    /// The payable total is `ceil(subtotal + shipping + taxes)`: the
    /// customer never pays fractional paise created by discounted unit
    /// prices, and rounding always favours the store by at most one rupee.
    #[must_use]
    pub fn compute(lines: &[CartLine], policy: &PricingPolicy) -> Self {
        let subtotal: Decimal = lines.iter().map(|line| line.line_total()).sum();
        let item_count = lines.iter().map(|line| line.quantity).sum();

        let gross = subtotal + policy.shipping.to_decimal() + policy.taxes.to_decimal();

        Self {
            subtotal,
            item_count,
            total: Rupees::from_decimal_ceil(gross),
        }
    }

    /// Whether this cart may proceed to payment.
    ///
    /// An empty cart is never eligible, regardless of the threshold.
    #[must_use]
    pub fn is_checkout_eligible(&self, policy: &PricingPolicy) -> bool {
        self.item_count > 0 && self.total >= policy.minimum_order
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn policy(shipping: i64, taxes: i64, minimum: i64) -> PricingPolicy {
        PricingPolicy {
            shipping: Rupees::new(shipping),
            taxes: Rupees::new(taxes),
            minimum_order: Rupees::new(minimum),
        }
    }

    #[test]
    fn test_two_hundred_rupee_cart() {
        // Two units at 100: subtotal 200, total 200 + 20 + 10 = 230.
        let lines = [CartLine::new(dec("100"), 2)];
        let totals = CartTotals::compute(&lines, &policy(20, 10, 200));

        assert_eq!(totals.subtotal, dec("200"));
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.total, Rupees::new(230));
        assert!(totals.is_checkout_eligible(&policy(20, 10, 200)));
    }

    #[test]
    fn test_threshold_boundary() {
        let lines = [CartLine::new(dec("100"), 2)];
        let totals = CartTotals::compute(&lines, &policy(20, 10, 499));

        // 230 is below a 499 threshold but exactly meets a 230 one.
        assert!(!totals.is_checkout_eligible(&policy(20, 10, 499)));
        assert!(totals.is_checkout_eligible(&policy(20, 10, 230)));
        assert!(!totals.is_checkout_eligible(&policy(20, 10, 231)));
    }

    #[test]
    fn test_empty_cart_never_eligible() {
        let totals = CartTotals::compute(&[], &policy(20, 10, 0));

        assert_eq!(totals.item_count, 0);
        assert_eq!(totals.subtotal, Decimal::ZERO);
        // Shipping and taxes alone exceed a zero threshold, but an empty
        // cart must still be refused.
        assert!(!totals.is_checkout_eligible(&policy(20, 10, 0)));
    }

    #[test]
    fn test_fractional_subtotal_rounds_up() {
        // Discounted unit price with a fraction: 934.15 + 30 = 964.15,
        // payable 965.
        let lines = [CartLine::new(dec("934.15"), 1)];
        let totals = CartTotals::compute(&lines, &policy(20, 10, 200));

        assert_eq!(totals.subtotal, dec("934.15"));
        assert_eq!(totals.total, Rupees::new(965));
    }

    #[test]
    fn test_total_monotone_in_quantity() {
        let p = policy(20, 10, 200);
        let mut previous = Rupees::ZERO;
        for quantity in 0..=10 {
            let lines = [
                CartLine::new(dec("99.99"), quantity),
                CartLine::new(dec("149"), 1),
            ];
            let totals = CartTotals::compute(&lines, &p);
            assert!(totals.total >= previous, "total decreased at quantity {quantity}");
            previous = totals.total;
        }
    }

    #[test]
    fn test_zero_quantity_line_contributes_nothing() {
        let with_zero = [CartLine::new(dec("500"), 1), CartLine::new(dec("80"), 0)];
        let without = [CartLine::new(dec("500"), 1)];
        let p = policy(20, 10, 200);

        assert_eq!(
            CartTotals::compute(&with_zero, &p).total,
            CartTotals::compute(&without, &p).total
        );
    }
}
