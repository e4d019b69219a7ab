//! Order history and order confirmation pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::Order;
use fortynine_core::types::{OrderId, OrderStatus, PaymentMode, display_price};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Orders shown per history page.
const ORDERS_PER_PAGE: u32 = 5;

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
}

// =============================================================================
// Order Views
// =============================================================================

/// One ordered line for display.
#[derive(Clone)]
pub struct OrderLineView {
    pub product_id: String,
    pub title: String,
    pub thumbnail: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// An order ready for rendering.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub placed_at: DateTime<Utc>,
    pub status: &'static str,
    /// CSS class suffix for the status badge.
    pub status_class: &'static str,
    pub payment_label: &'static str,
    pub total: String,
    pub items: Vec<OrderLineView>,
}

/// CSS class suffix for an order status badge.
const fn status_class(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "pending",
        OrderStatus::Dispatched => "dispatched",
        OrderStatus::OutForDelivery => "out-for-delivery",
        OrderStatus::Delivered => "delivered",
        OrderStatus::Cancelled => "cancelled",
    }
}

/// Customer-facing name for how the order is paid.
const fn payment_label(mode: PaymentMode) -> &'static str {
    match mode {
        PaymentMode::Cod => "Cash on Delivery",
        PaymentMode::Online => "Paid Online",
    }
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            placed_at: order.created_at,
            status: order.status.as_str(),
            status_class: status_class(order.status),
            payment_label: payment_label(order.payment_mode),
            total: order.total.to_string(),
            items: order
                .items
                .iter()
                .map(|item| {
                    let unit = item.unit_price();
                    OrderLineView {
                        product_id: item.product.id.to_string(),
                        title: item.product.title.clone(),
                        thumbnail: item.product.thumbnail.clone(),
                        quantity: item.quantity,
                        unit_price: display_price(unit),
                        line_total: display_price(
                            unit * rust_decimal::Decimal::from(item.quantity),
                        ),
                    }
                })
                .collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub user: Option<CurrentUser>,
    pub orders: Vec<OrderView>,
    pub current_page: u32,
    pub total_pages: u64,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/success.html")]
pub struct OrderSuccessTemplate {
    pub user: Option<CurrentUser>,
    pub order: OrderView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the customer's order history, newest first.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<PaginationQuery>,
) -> Result<OrdersTemplate> {
    let current_page = query.page.unwrap_or(1).max(1);

    let page = state
        .api()
        .get_user_orders(&user.token, &user.id, current_page, ORDERS_PER_PAGE)
        .await?;

    Ok(OrdersTemplate {
        user: Some(user),
        orders: page.items.iter().map(OrderView::from).collect(),
        current_page,
        total_pages: page.page_count(u64::from(ORDERS_PER_PAGE)),
    })
}

/// Display the confirmation page for a just-placed order.
///
/// Orders come back newest first, so the fresh order is on the first
/// page. Anything not found there is treated as an unknown order.
#[instrument(skip(state, user))]
pub async fn success(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<OrderSuccessTemplate> {
    let page = state
        .api()
        .get_user_orders(&user.token, &user.id, 1, ORDERS_PER_PAGE)
        .await?;

    let order = page
        .items
        .iter()
        .find(|order| order.id == order_id)
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    Ok(OrderSuccessTemplate {
        user: Some(user),
        order: OrderView::from(order),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "user": "u1",
            "item": [{
                "product": {
                    "_id": "p1",
                    "title": "Steel Water Bottle",
                    "description": "1L insulated bottle.",
                    "price": 550.0,
                    "stockQuantity": 12,
                    "thumbnail": "https://cdn.example.com/bottle.jpg",
                    "images": [],
                    "brand": {"_id": "b1", "name": "Milton"},
                    "category": {"_id": "c1", "name": "Kitchen"}
                },
                "quantity": 2
            }],
            "address": {
                "_id": "a1",
                "user": "u1",
                "type": "Home",
                "street": "14 MG Road",
                "country": "India",
                "phoneNumber": "9876543210",
                "state": "Maharashtra",
                "city": "Ulwe",
                "postalCode": "410206"
            },
            "paymentMode": "COD",
            "total": 1130,
            "status": "Pending",
            "createdAt": "2026-08-02T09:30:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_order_view_lines_and_total() {
        let view = OrderView::from(&order());

        assert_eq!(view.total, "\u{20b9}1,130");
        assert_eq!(view.status, "Pending");
        assert_eq!(view.status_class, "pending");
        assert_eq!(view.payment_label, "Cash on Delivery");

        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 2);
        assert_eq!(view.items[0].unit_price, "\u{20b9}550");
        assert_eq!(view.items[0].line_total, "\u{20b9}1,100");
    }

    #[test]
    fn test_status_class_covers_every_status() {
        for status in OrderStatus::ALL {
            assert!(!status_class(status).is_empty());
        }
    }
}
