//! Cart view models for templates.
//!
//! Converts API cart lines plus the pricing policy into display-ready
//! strings. Templates never do money arithmetic.

use fortynine_core::api::{CartItem, MAX_LINE_QUANTITY};
use fortynine_core::pricing::{CartLine, CartTotals, PricingPolicy};
use fortynine_core::types::{CartItemId, ProductId, display_price};

/// A cart line ready for rendering.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub title: String,
    pub thumbnail: String,
    pub quantity: u32,
    /// Upper bound for the quantity selector: stock, capped per line.
    pub max_quantity: u32,
    /// Unit price snapshot, formatted.
    pub unit_price: String,
    /// Quantity times unit price, formatted.
    pub line_total: String,
    pub in_stock: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let unit = item.unit_price();
        Self {
            id: item.id.clone(),
            product_id: item.product.id.clone(),
            title: item.product.title.clone(),
            thumbnail: item.product.thumbnail.clone(),
            quantity: item.quantity,
            max_quantity: item.product.stock_quantity.min(MAX_LINE_QUANTITY),
            unit_price: display_price(unit),
            line_total: display_price(unit * rust_decimal::Decimal::from(item.quantity)),
            in_stock: item.product.in_stock(),
        }
    }
}

/// Totals block shown on the cart and checkout pages.
#[derive(Debug, Clone)]
pub struct CartSummary {
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub taxes: String,
    /// Payable total (whole rupees, rounded up), formatted.
    pub total: String,
    /// Whether checkout is open for this cart.
    pub eligible: bool,
    /// Threshold shown when the cart is under it.
    pub minimum_order: String,
}

/// The whole cart, ready for rendering.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub summary: CartSummary,
}

impl CartView {
    /// Build the view from API cart lines and the store's pricing policy.
    #[must_use]
    pub fn from_items(items: &[CartItem], policy: &PricingPolicy) -> Self {
        let totals = cart_totals(items, policy);

        Self {
            lines: items.iter().map(CartLineView::from).collect(),
            summary: CartSummary {
                item_count: totals.item_count,
                subtotal: display_price(totals.subtotal),
                shipping: policy.shipping.to_string(),
                taxes: policy.taxes.to_string(),
                total: totals.total.to_string(),
                eligible: totals.is_checkout_eligible(policy),
                minimum_order: policy.minimum_order.to_string(),
            },
        }
    }

    /// An empty cart under the given policy. Never checkout-eligible.
    #[must_use]
    pub fn empty(policy: &PricingPolicy) -> Self {
        Self::from_items(&[], policy)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compute aggregate totals for a set of API cart lines.
///
/// Each line contributes the price of its embedded product snapshot.
#[must_use]
pub fn cart_totals(items: &[CartItem], policy: &PricingPolicy) -> CartTotals {
    let lines: Vec<CartLine> = items
        .iter()
        .map(|item| CartLine::new(item.unit_price(), item.quantity))
        .collect();
    CartTotals::compute(&lines, policy)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fortynine_core::types::Rupees;
    use rust_decimal::Decimal;

    fn policy() -> PricingPolicy {
        PricingPolicy {
            shipping: Rupees::new(20),
            taxes: Rupees::new(10),
            minimum_order: Rupees::new(499),
        }
    }

    fn item(price: i64, quantity: u32) -> CartItem {
        serde_json::from_value(serde_json::json!({
            "_id": format!("line-{price}-{quantity}"),
            "user": "u1",
            "product": {
                "_id": "p1",
                "title": "Steel Water Bottle",
                "description": "1L insulated bottle",
                "price": price,
                "stockQuantity": 5,
                "thumbnail": "https://cdn.example.com/bottle.jpg",
                "images": [],
                "brand": {"_id": "b1", "name": "Milton"},
                "category": {"_id": "c1", "name": "Kitchen"}
            },
            "quantity": quantity
        }))
        .unwrap()
    }

    #[test]
    fn test_view_totals_include_fees() {
        // 100 x 2 = 200 subtotal, +20 shipping +10 taxes = 230 total
        let view = CartView::from_items(&[item(100, 2)], &policy());
        assert_eq!(view.summary.item_count, 2);
        assert_eq!(view.summary.subtotal, "\u{20b9}200");
        assert_eq!(view.summary.total, "\u{20b9}230");
        assert!(!view.summary.eligible);
    }

    #[test]
    fn test_view_eligibility_respects_threshold() {
        let view = CartView::from_items(&[item(500, 1)], &policy());
        // 500 + 30 fees = 530, past the 499 threshold
        assert!(view.summary.eligible);
    }

    #[test]
    fn test_empty_cart_never_eligible() {
        let zero_threshold = PricingPolicy {
            minimum_order: Rupees::ZERO,
            ..policy()
        };
        let view = CartView::empty(&zero_threshold);
        assert!(view.is_empty());
        assert!(!view.summary.eligible);
    }

    #[test]
    fn test_line_view_multiplies_snapshot_price() {
        let view = CartView::from_items(&[item(150, 3)], &policy());
        let line = &view.lines[0];
        assert_eq!(line.unit_price, "\u{20b9}150");
        assert_eq!(line.line_total, "\u{20b9}450");
        assert!(line.in_stock);
    }

    #[test]
    fn test_totals_price_each_line_from_its_product() {
        let mut repriced = item(100, 1);
        repriced.product.price = Decimal::from(999);
        let totals = cart_totals(&[repriced], &policy());
        assert_eq!(totals.subtotal, Decimal::from(999));
    }
}
