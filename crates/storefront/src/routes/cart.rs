//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Lines live in the commerce backend keyed by user; after every mutation
//! the line list and the nav badge re-render as fragments.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::{AddToCartRequest, MAX_LINE_QUANTITY};
use fortynine_core::types::{CartItemId, ProductId};

use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{CartView, CurrentUser};
use crate::state::AppState;

// =============================================================================
// Query and Form Parameters
// =============================================================================

/// Flash message codes carried on the cart page URL.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Map a cart error code from the URL to customer-facing text.
fn cart_error_message(code: &str) -> &'static str {
    match code {
        "payment-session" => {
            "Your payment session expired before the order could be placed. Your cart is unchanged."
        }
        _ => "Something went wrong. Please try again.",
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Bound a requested quantity by available stock and the per-line cap.
fn clamped_quantity(requested: u32, stock: u32) -> u32 {
    requested.max(1).min(stock).min(MAX_LINE_QUANTITY)
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub user: Option<CurrentUser>,
    pub cart: CartView,
    pub error: Option<&'static str>,
}

/// Cart line list fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Fetch Helpers
// =============================================================================

/// Fetch the customer's cart, falling back to an empty view on error.
async fn fetch_cart_view(state: &AppState, user: &CurrentUser) -> CartView {
    match state.api().get_cart(&user.token, &user.id).await {
        Ok(items) => CartView::from_items(&items, state.pricing()),
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            CartView::empty(state.pricing())
        }
    }
}

/// Total units across the customer's cart lines.
async fn fetch_cart_count(state: &AppState, user: &CurrentUser) -> u32 {
    state
        .api()
        .get_cart(&user.token, &user.id)
        .await
        .map(|items| items.iter().map(|item| item.quantity).sum::<u32>())
        .unwrap_or(0)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> CartShowTemplate {
    let cart = fetch_cart_view(&state, &user).await;

    CartShowTemplate {
        user: Some(user),
        cart,
        error: query.error.as_deref().map(cart_error_message),
    }
}

/// Add a product to the cart (HTMX).
///
/// The requested quantity is bounded by available stock and the per-line
/// cap before the backend sees it. Returns the nav badge fragment plus an
/// HTMX trigger so other cart views refresh themselves.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product = match state.api().get_product(&form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to fetch product for add-to-cart: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"error-text\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };

    if !product.in_stock() {
        return (
            StatusCode::CONFLICT,
            Html("<span class=\"error-text\">Out of stock</span>"),
        )
            .into_response();
    }

    let request = AddToCartRequest {
        user: user.id.clone(),
        product: form.product_id,
        quantity: clamped_quantity(form.quantity.unwrap_or(1), product.stock_quantity),
    };

    match state.api().add_to_cart(&user.token, &request).await {
        Ok(_) => {
            let count = fetch_cart_count(&state, &user).await;
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CartCountTemplate { count },
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to add item to cart: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"error-text\">Error adding to cart</span>"),
            )
                .into_response()
        }
    }
}

/// Update a cart line's quantity (HTMX).
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let quantity = form.quantity.clamp(1, MAX_LINE_QUANTITY);

    if let Err(e) = state
        .api()
        .update_cart_item(&user.token, &form.item_id, quantity)
        .await
    {
        tracing::error!("Failed to update cart line {}: {e}", form.item_id);
    }

    // Render whatever the backend now holds, even after a rejected update.
    let cart = fetch_cart_view(&state, &user).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    if let Err(e) = state
        .api()
        .remove_cart_item(&user.token, &form.item_id)
        .await
    {
        tracing::error!("Failed to remove cart line {}: {e}", form.item_id);
    }

    let cart = fetch_cart_view(&state, &user).await;
    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate { cart },
    )
        .into_response()
}

/// Render the nav cart badge (HTMX).
#[instrument(skip(state, user))]
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> CartCountTemplate {
    let count = match user {
        Some(user) => fetch_cart_count(&state, &user).await,
        None => 0,
    };

    CartCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_quantity() {
        assert_eq!(clamped_quantity(3, 50), 3);
        assert_eq!(clamped_quantity(0, 50), 1);
        assert_eq!(clamped_quantity(8, 5), 5);
        assert_eq!(clamped_quantity(99, 500), MAX_LINE_QUANTITY);
    }

    #[test]
    fn test_cart_error_messages() {
        assert!(cart_error_message("payment-session").contains("unchanged"));
        assert_eq!(
            cart_error_message("nonsense"),
            "Something went wrong. Please try again."
        );
    }
}
