//! Money in Indian rupees.
//!
//! The store prices everything in whole rupees. Cart arithmetic uses
//! [`Decimal`] (unit prices may carry fractions after percentage discounts)
//! and the final order total is always rounded *up* to a whole-rupee
//! [`Rupees`] value. The payment gateway wants amounts in paise, the minor
//! unit (1 rupee = 100 paise).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A whole-rupee amount.
///
/// Order totals, shipping, taxes, and the minimum-order threshold are all
/// whole rupees. Display formatting uses Indian digit grouping
/// (`₹1,23,456`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Rupees(i64);

impl Rupees {
    /// Zero rupees.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole rupees.
    #[must_use]
    pub const fn new(rupees: i64) -> Self {
        Self(rupees)
    }

    /// The amount in whole rupees.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// The amount in paise, the unit the payment gateway expects.
    #[must_use]
    pub const fn paise(self) -> i64 {
        self.0 * 100
    }

    /// Round a decimal rupee amount up to the next whole rupee.
    ///
    /// Saturates at `i64::MAX` for amounts beyond any realistic cart.
    #[must_use]
    pub fn from_decimal_ceil(amount: Decimal) -> Self {
        Self(amount.ceil().to_i64().unwrap_or(i64::MAX))
    }

    /// The amount as a [`Decimal`] for exact arithmetic.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl std::ops::Add for Rupees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{20b9}{}", group_indian(self.0))
    }
}

/// Format an integer with Indian digit grouping (last three digits, then
/// pairs): `1234567` becomes `12,34,567`.
fn group_indian(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let len = digits.len();

    for (i, c) in digits.chars().enumerate() {
        grouped.push(c);
        let remaining = len - i - 1;
        if remaining == 0 {
            continue;
        }
        // Separator after the leading digit of each group: the final group
        // has three digits, every group before it has two.
        if remaining == 3 || (remaining > 3 && (remaining - 3) % 2 == 0) {
            grouped.push(',');
        }
    }

    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a decimal rupee amount for display, trimming a zero fraction:
/// `1099` becomes `₹1,099` and `934.15` becomes `₹934.15`.
#[must_use]
pub fn display_price(amount: Decimal) -> String {
    let whole = amount.trunc();
    let fraction = amount - whole;

    let whole_part = group_indian(whole.to_i64().unwrap_or(0));
    if fraction.is_zero() {
        format!("\u{20b9}{whole_part}")
    } else {
        let paise = (fraction * Decimal::from(100)).round().to_i64().unwrap_or(0);
        format!("\u{20b9}{whole_part}.{paise:02}")
    }
}
