//! Order dashboard handlers.
//!
//! One page: every order in the store, searchable by id, filterable by
//! lifecycle status, sortable by creation date, ten to a page. Status
//! changes post back per row and are checked against the lifecycle
//! rules before the backend is asked.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::Order;
use fortynine_core::types::{OrderId, OrderStatus, PaymentMode};

use crate::backend::OrderListQuery;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Orders shown per dashboard page.
const ORDERS_PER_PAGE: u32 = 10;

// =============================================================================
// Query types
// =============================================================================

/// Dashboard query parameters, preserved across pagination and status
/// updates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<u32>,
    /// Substring of the order id to search for.
    pub search: Option<String>,
    /// Lifecycle status to filter by.
    pub status: Option<String>,
    /// Creation-date sort: "asc" or "desc" (default).
    pub sort: Option<String>,
}

impl OrdersQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Trimmed search term, if any.
    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    /// Parsed status filter; unknown values are treated as "all".
    fn status_filter(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    fn sort_order(&self) -> &str {
        match self.sort.as_deref() {
            Some("asc") => "asc",
            _ => "desc",
        }
    }

    /// Query string for links that keep the current view (no page).
    fn preserve_params(&self) -> String {
        let mut parts = Vec::new();
        if let Some(search) = self.search_term() {
            parts.push(format!("search={}", url_escape(&search)));
        }
        if let Some(status) = self.status_filter() {
            parts.push(format!("status={}", url_escape(status.as_str())));
        }
        if self.sort_order() == "asc" {
            parts.push("sort=asc".to_string());
        }
        parts.join("&")
    }

    fn backend_query(&self) -> OrderListQuery {
        OrderListQuery {
            search_id: self.search_term(),
            filter_status: self.status_filter(),
            sort_order: Some(self.sort_order().to_string()),
            page: self.page(),
            limit: ORDERS_PER_PAGE,
        }
    }
}

/// Form-encode a query-string value.
pub(super) fn url_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// =============================================================================
// Views
// =============================================================================

/// One order row on the dashboard.
pub struct OrderRowView {
    pub id: String,
    pub placed_at: DateTime<Utc>,
    pub customer: String,
    pub city: String,
    pub item_count: u32,
    pub total: String,
    pub payment_label: &'static str,
    pub status: OrderStatus,
    pub status_label: &'static str,
    /// Statuses this order may legally move to.
    pub next_statuses: Vec<&'static str>,
}

impl From<&Order> for OrderRowView {
    fn from(order: &Order) -> Self {
        let next_statuses = OrderStatus::ALL
            .into_iter()
            .filter(|next| order.status.can_transition_to(*next))
            .map(OrderStatus::as_str)
            .collect();

        Self {
            id: order.id.to_string(),
            placed_at: order.created_at,
            customer: order.user.to_string(),
            city: order.address.city.clone(),
            item_count: order.items.iter().map(|item| item.quantity).sum(),
            total: order.total.to_string(),
            payment_label: match order.payment_mode {
                PaymentMode::Cod => "COD",
                PaymentMode::Online => "Prepaid",
            },
            status: order.status,
            status_label: order.status.as_str(),
            next_statuses,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Order dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersDashboardTemplate {
    pub admin: CurrentAdmin,
    pub orders: Vec<OrderRowView>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_orders: u64,
    /// Current search term, echoed into the form.
    pub search_value: String,
    /// Current status filter as a wire string, or empty for "all".
    pub status_value: String,
    pub sort_value: String,
    /// Query string carrying search/filter/sort for pagination links.
    pub preserve_params: String,
    /// All statuses, for the filter dropdown.
    pub all_statuses: Vec<&'static str>,
    pub error: Option<&'static str>,
    pub updated: Option<String>,
}

/// Map an error code from the URL to staff-facing text.
fn error_message(code: &str) -> &'static str {
    match code {
        "transition" => "That status change is not allowed.",
        _ => "Something went wrong. Please try again.",
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Dashboard query: the view parameters plus one-shot feedback from a
/// status update redirect.
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub error: Option<String>,
    pub updated: Option<String>,
}

impl DashboardQuery {
    fn view(&self) -> OrdersQuery {
        OrdersQuery {
            page: self.page,
            search: self.search.clone(),
            status: self.status.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Display the order dashboard.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(query): Query<DashboardQuery>,
) -> Result<OrdersDashboardTemplate> {
    let view = query.view();
    let page = state
        .api()
        .list_orders(&admin.token, &view.backend_query())
        .await?;

    Ok(OrdersDashboardTemplate {
        orders: page.items.iter().map(OrderRowView::from).collect(),
        current_page: view.page(),
        total_pages: page.page_count(u64::from(ORDERS_PER_PAGE)),
        total_orders: page.total,
        search_value: view.search_term().unwrap_or_default(),
        status_value: view
            .status_filter()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        sort_value: view.sort_order().to_string(),
        preserve_params: view.preserve_params(),
        all_statuses: OrderStatus::ALL.map(OrderStatus::as_str).to_vec(),
        error: query.error.as_deref().map(error_message),
        updated: query.updated,
        admin,
    })
}

/// Status update form data. The row's current status rides along so the
/// lifecycle check can run before the backend is contacted, and the
/// view parameters ride along as hidden fields so the redirect lands
/// back on the same dashboard page.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusForm {
    pub from: String,
    pub to: String,
    pub page: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl UpdateStatusForm {
    fn view(&self) -> OrdersQuery {
        OrdersQuery {
            page: self.page,
            search: self.search.clone(),
            status: self.status.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Move an order to a new lifecycle status.
///
/// Backward moves and edits to delivered or cancelled orders are
/// refused here; the backend enforces the same rules.
#[instrument(skip(state, admin, form), fields(order = %order_id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(order_id): Path<OrderId>,
    Form(form): Form<UpdateStatusForm>,
) -> Result<Redirect> {
    let view = form.view();
    let back = |suffix: &str| {
        let preserved = view.preserve_params();
        let page = view.page();
        if preserved.is_empty() {
            Redirect::to(&format!("/orders?page={page}&{suffix}"))
        } else {
            Redirect::to(&format!("/orders?page={page}&{preserved}&{suffix}"))
        }
    };

    let from: OrderStatus = form
        .from
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;
    let next: OrderStatus = form
        .to
        .parse()
        .map_err(|e: String| AppError::BadRequest(e))?;

    if !from.can_transition_to(next) {
        tracing::warn!(%from, %next, "Refused order status transition");
        return Ok(back("error=transition"));
    }

    state
        .api()
        .update_order_status(&admin.token, &order_id, next)
        .await?;

    Ok(back(&format!("updated={}", url_escape(&order_id.to_string()))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = OrdersQuery::default();
        assert_eq!(query.page(), 1);
        assert!(query.search_term().is_none());
        assert!(query.status_filter().is_none());
        assert_eq!(query.sort_order(), "desc");
        assert_eq!(query.preserve_params(), "");
    }

    #[test]
    fn test_preserve_params_encode_the_status() {
        let query = OrdersQuery {
            page: Some(3),
            search: Some("  664f  ".to_string()),
            status: Some("Out for delivery".to_string()),
            sort: Some("asc".to_string()),
        };
        assert_eq!(
            query.preserve_params(),
            "search=664f&status=Out+for+delivery&sort=asc"
        );
        // Page is deliberately not preserved; links supply their own.
        assert!(!query.preserve_params().contains("page"));
    }

    #[test]
    fn test_url_escape_uses_form_encoding() {
        assert_eq!(url_escape("Navi Mumbai"), "Navi+Mumbai");
        assert_eq!(url_escape("a&b=c?"), "a%26b%3Dc%3F");
        assert_eq!(url_escape("plain-value_1.0"), "plain-value_1.0");
    }

    #[test]
    fn test_unknown_status_filter_means_all() {
        let query = OrdersQuery {
            status: Some("Shipped".to_string()),
            ..OrdersQuery::default()
        };
        assert!(query.status_filter().is_none());
    }

    #[test]
    fn test_backend_query_carries_the_view() {
        let query = OrdersQuery {
            page: Some(2),
            search: Some("664f".to_string()),
            status: Some("Pending".to_string()),
            sort: None,
        };
        let backend = query.backend_query();
        assert_eq!(backend.page, 2);
        assert_eq!(backend.limit, ORDERS_PER_PAGE);
        assert_eq!(backend.search_id.as_deref(), Some("664f"));
        assert_eq!(backend.filter_status, Some(OrderStatus::Pending));
        assert_eq!(backend.sort_order.as_deref(), Some("desc"));
    }

    #[test]
    fn test_order_row_offers_only_legal_moves() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "o1",
            "user": "u1",
            "item": [
                {
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
                }
            ],
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
            "status": "Out for delivery",
            "createdAt": "2026-08-02T09:30:00Z"
        }))
        .unwrap();

        let row = OrderRowView::from(&order);
        assert_eq!(row.item_count, 2);
        assert_eq!(row.city, "Ulwe");
        assert_eq!(row.payment_label, "COD");
        // Out for delivery can only go forward or be cancelled.
        assert_eq!(row.next_statuses, vec!["Delivered", "Cancelled"]);
    }
}
