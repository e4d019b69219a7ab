//! Wishlist route handlers.
//!
//! The wishlist is plain forms and redirects; unlike the cart there is no
//! badge to keep fresh, so nothing here needs fragment swaps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::{CreateWishlistItemRequest, WishlistItem};
use fortynine_core::types::{ProductId, WishlistItemId, display_price};

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Wishlist entries shown per page.
const ITEMS_PER_PAGE: u32 = 8;

// =============================================================================
// Query and Form Parameters
// =============================================================================

/// Pagination and flash message codes on the wishlist page URL.
#[derive(Debug, Deserialize)]
pub struct WishlistQuery {
    pub page: Option<u32>,
    pub error: Option<String>,
}

/// Map a wishlist error code from the URL to customer-facing text.
fn wishlist_error_message(code: &str) -> &'static str {
    match code {
        "note" => "Could not save the note. Please try again.",
        "remove" => "Could not remove the item. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Add to wishlist form data.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistForm {
    pub product_id: ProductId,
    pub note: Option<String>,
}

/// Note edit form data.
#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub note: String,
}

// =============================================================================
// Views
// =============================================================================

/// Wishlist entry display data for templates.
#[derive(Clone)]
pub struct WishlistItemView {
    pub id: String,
    pub product_id: String,
    pub title: String,
    pub brand: String,
    pub price: String,
    /// Discounted price, shown next to the struck-through list price.
    pub sale_price: Option<String>,
    pub thumbnail: String,
    pub in_stock: bool,
    pub note: Option<String>,
}

impl From<&WishlistItem> for WishlistItemView {
    fn from(item: &WishlistItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_id: item.product.id.to_string(),
            title: item.product.title.clone(),
            brand: item.product.brand.name.clone(),
            price: display_price(item.product.price),
            sale_price: item
                .product
                .discount_percentage
                .map(|_| display_price(item.product.sale_price())),
            thumbnail: item.product.thumbnail.clone(),
            in_stock: item.product.in_stock(),
            note: item.note.clone(),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/index.html")]
pub struct WishlistTemplate {
    pub user: Option<CurrentUser>,
    pub items: Vec<WishlistItemView>,
    pub current_page: u32,
    pub total_pages: u64,
    pub error: Option<&'static str>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the wishlist page.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<WishlistQuery>,
) -> Result<WishlistTemplate> {
    let current_page = query.page.unwrap_or(1).max(1);

    let page = state
        .api()
        .get_wishlist(&user.token, &user.id, current_page, ITEMS_PER_PAGE)
        .await?;

    Ok(WishlistTemplate {
        user: Some(user),
        items: page.items.iter().map(WishlistItemView::from).collect(),
        current_page,
        total_pages: page.page_count(u64::from(ITEMS_PER_PAGE)),
        error: query.error.as_deref().map(wishlist_error_message),
    })
}

/// Save a product to the wishlist.
#[instrument(skip(state, user, form))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToWishlistForm>,
) -> Redirect {
    let product_id = form.product_id.clone();
    let request = CreateWishlistItemRequest {
        user: user.id,
        product: form.product_id,
        note: form
            .note
            .map(|note| note.trim().to_string())
            .filter(|note| !note.is_empty()),
    };

    match state.api().add_to_wishlist(&user.token, &request).await {
        Ok(_) => Redirect::to(&format!("/products/{product_id}?success=wishlist-added")),
        Err(e) => {
            tracing::error!("Failed to add to wishlist: {e}");
            Redirect::to(&format!("/products/{product_id}?error=wishlist"))
        }
    }
}

/// Update the note on a wishlist entry.
#[instrument(skip(state, user, form))]
pub async fn update_note(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<WishlistItemId>,
    Form(form): Form<NoteForm>,
) -> Redirect {
    match state
        .api()
        .update_wishlist_note(&user.token, &item_id, form.note.trim().to_string())
        .await
    {
        Ok(_) => Redirect::to("/wishlist"),
        Err(e) => {
            tracing::error!("Failed to update wishlist note {item_id}: {e}");
            Redirect::to("/wishlist?error=note")
        }
    }
}

/// Remove an entry from the wishlist.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<WishlistItemId>,
) -> Redirect {
    match state.api().remove_from_wishlist(&user.token, &item_id).await {
        Ok(()) => Redirect::to("/wishlist"),
        Err(e) => {
            tracing::error!("Failed to remove wishlist item {item_id}: {e}");
            Redirect::to("/wishlist?error=remove")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wishlist_view_carries_note_and_sale_price() {
        let item: WishlistItem = serde_json::from_value(serde_json::json!({
            "_id": "w1",
            "user": "u1",
            "product": {
                "_id": "p1",
                "title": "Desk Lamp",
                "description": "LED desk lamp.",
                "price": 800.0,
                "discountPercentage": 25.0,
                "stockQuantity": 4,
                "thumbnail": "https://cdn.example.com/lamp.jpg",
                "images": [],
                "brand": {"_id": "b1", "name": "Philips"},
                "category": {"_id": "c1", "name": "Home"}
            },
            "note": "Birthday gift idea"
        }))
        .unwrap();

        let view = WishlistItemView::from(&item);
        assert_eq!(view.price, "\u{20b9}800");
        assert_eq!(view.sale_price.as_deref(), Some("\u{20b9}600"));
        assert_eq!(view.note.as_deref(), Some("Birthday gift idea"));
        assert!(view.in_stock);
    }

    #[test]
    fn test_wishlist_error_messages() {
        assert!(wishlist_error_message("note").contains("note"));
        assert_eq!(
            wishlist_error_message("other"),
            "Something went wrong. Please try again."
        );
    }
}
