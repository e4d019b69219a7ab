//! Product detail page and review handlers.
//!
//! The detail page shows the product, its stock position, and customer
//! reviews. Logged-in customers can post one review per product and edit
//! or delete their own.

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

use fortynine_core::api::{
    CreateReviewRequest, MAX_LINE_QUANTITY, Product, Review, UpdateReviewRequest,
};
use fortynine_core::types::{ProductId, ReviewId, display_price};

use crate::error::Result;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Query and Form Parameters
// =============================================================================

/// Flash message codes carried on the product page URL.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Review form data, shared by create and edit.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    pub comment: String,
}

/// Map a product page error code from the URL to customer-facing text.
fn product_error_message(code: &str) -> &'static str {
    match code {
        "rating" => "Pick a rating between 1 and 5 stars.",
        "comment" => "Write a few words about the product before posting.",
        "review" => "Could not save your review. Please try again.",
        "wishlist" => "Could not add to your wishlist. Please try again.",
        _ => "Something went wrong. Please try again.",
    }
}

/// Map a product page success code from the URL to customer-facing text.
fn product_success_message(code: &str) -> &'static str {
    match code {
        "review-posted" => "Thanks! Your review has been posted.",
        "review-updated" => "Your review has been updated.",
        "review-deleted" => "Your review has been removed.",
        "wishlist-added" => "Added to your wishlist.",
        _ => "Done.",
    }
}

// =============================================================================
// Product Views
// =============================================================================

/// Product display data for the detail page.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub brand: String,
    pub category: String,
    pub price: String,
    /// Discounted price, shown next to the struck-through list price.
    pub sale_price: Option<String>,
    pub discount_label: Option<String>,
    pub thumbnail: String,
    pub images: Vec<String>,
    pub in_stock: bool,
    /// Stock position message, e.g. "Only 3 left in stock!".
    pub stock_message: String,
    /// CSS class suffix for the stock message: "low", "limited", or "in".
    pub stock_class: &'static str,
    /// Quantity choices for the add-to-cart dropdown.
    pub quantity_options: Vec<u32>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        let sale_price = product
            .discount_percentage
            .map(|_| display_price(product.sale_price()));
        let discount_label = product
            .discount_percentage
            .map(|discount| format!("{}% off", discount.normalize()));

        let (stock_message, stock_class) = match product.stock_quantity {
            0 => ("Out of stock".to_string(), "out"),
            n if n <= 10 => (format!("Only {n} left in stock!"), "low"),
            n if n <= 20 => ("Limited stock available!".to_string(), "limited"),
            _ => ("In stock".to_string(), "in"),
        };

        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            description: product.description.clone(),
            brand: product.brand.name.clone(),
            category: product.category.name.clone(),
            price: display_price(product.price),
            sale_price,
            discount_label,
            thumbnail: product.thumbnail.clone(),
            images: product.images.clone(),
            in_stock: product.in_stock(),
            stock_message,
            stock_class,
            quantity_options: (1..=product.stock_quantity.min(MAX_LINE_QUANTITY)).collect(),
        }
    }
}

/// Review display data for the detail page.
#[derive(Clone)]
pub struct ReviewView {
    pub id: String,
    pub author: String,
    pub rating: u8,
    pub comment: String,
    pub posted_at: DateTime<Utc>,
    /// Whether the viewing customer wrote this review.
    pub is_mine: bool,
}

impl ReviewView {
    fn from_review(review: &Review, viewer: Option<&CurrentUser>) -> Self {
        Self {
            id: review.id.to_string(),
            author: review.user.name.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            posted_at: review.created_at,
            is_mine: viewer.is_some_and(|user| user.id == review.user.id),
        }
    }
}

/// One bar of the rating histogram.
#[derive(Clone)]
pub struct RatingBar {
    pub stars: u8,
    pub count: usize,
    pub percent: u32,
}

/// Build the five-star histogram from highest to lowest.
fn rating_histogram(reviews: &[Review]) -> Vec<RatingBar> {
    let total = reviews.len();
    (1..=5u8)
        .rev()
        .map(|stars| {
            let count = reviews.iter().filter(|r| r.rating == stars).count();
            let percent = if total == 0 {
                0
            } else {
                u32::try_from(count * 100 / total).unwrap_or(0)
            };
            RatingBar {
                stars,
                count,
                percent,
            }
        })
        .collect()
}

/// Average rating formatted to one decimal place, if any reviews exist.
fn average_rating(reviews: &[Review]) -> Option<String> {
    if reviews.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let average = reviews.iter().map(|r| f64::from(r.rating)).sum::<f64>() / reviews.len() as f64;
    Some(format!("{average:.1}"))
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub user: Option<CurrentUser>,
    pub product: ProductDetailView,
    pub reviews: Vec<ReviewView>,
    pub review_count: usize,
    pub average_rating: Option<String>,
    pub histogram: Vec<RatingBar>,
    /// Whether the viewing customer already has this product in their cart.
    pub in_cart: bool,
    /// Wishlist entry ID when the product is already saved.
    pub wishlist_item_id: Option<String>,
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Display the product detail page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(product_id): Path<ProductId>,
    Query(query): Query<MessageQuery>,
) -> Result<ProductShowTemplate> {
    let product = state.api().get_product(&product_id).await?;

    // Reviews are secondary content; render the page without them on error.
    let reviews = state
        .api()
        .get_product_reviews(&product_id)
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch reviews for {product_id}: {e}");
                Vec::new()
            },
            |reviews| reviews,
        );

    let (in_cart, wishlist_item_id) = match &user {
        Some(current) => (
            product_in_cart(&state, current, &product_id).await,
            wishlist_entry(&state, current, &product_id).await,
        ),
        None => (false, None),
    };

    Ok(ProductShowTemplate {
        review_count: reviews.len(),
        average_rating: average_rating(&reviews),
        histogram: rating_histogram(&reviews),
        reviews: reviews
            .iter()
            .map(|review| ReviewView::from_review(review, user.as_ref()))
            .collect(),
        user,
        product: ProductDetailView::from(&product),
        in_cart,
        wishlist_item_id,
        error: query.error.as_deref().map(product_error_message),
        success: query.success.as_deref().map(product_success_message),
    })
}

/// Whether the customer's cart already holds this product.
async fn product_in_cart(state: &AppState, user: &CurrentUser, product_id: &ProductId) -> bool {
    state
        .api()
        .get_cart(&user.token, &user.id)
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch cart: {e}");
                false
            },
            |items| items.iter().any(|item| item.product.id == *product_id),
        )
}

/// The customer's wishlist entry ID for this product, if saved.
async fn wishlist_entry(
    state: &AppState,
    user: &CurrentUser,
    product_id: &ProductId,
) -> Option<String> {
    match state.api().get_wishlist(&user.token, &user.id, 1, 100).await {
        Ok(page) => page
            .items
            .iter()
            .find(|item| item.product.id == *product_id)
            .map(|item| item.id.to_string()),
        Err(e) => {
            tracing::error!("Failed to fetch wishlist: {e}");
            None
        }
    }
}

// =============================================================================
// Review Handlers
// =============================================================================

/// Post a new review.
#[instrument(skip(state, user, form))]
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Redirect {
    if let Err(code) = validate_review(&form) {
        return Redirect::to(&format!("/products/{product_id}?error={code}"));
    }

    let request = CreateReviewRequest {
        user: user.id,
        product: product_id.clone(),
        rating: form.rating,
        comment: form.comment.trim().to_string(),
    };

    match state.api().create_review(&user.token, &request).await {
        Ok(_) => Redirect::to(&format!("/products/{product_id}?success=review-posted")),
        Err(e) => {
            tracing::error!("Failed to create review: {e}");
            Redirect::to(&format!("/products/{product_id}?error=review"))
        }
    }
}

/// Update the customer's own review.
#[instrument(skip(state, user, form))]
pub async fn update_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((product_id, review_id)): Path<(ProductId, ReviewId)>,
    Form(form): Form<ReviewForm>,
) -> Redirect {
    if let Err(code) = validate_review(&form) {
        return Redirect::to(&format!("/products/{product_id}?error={code}"));
    }

    let request = UpdateReviewRequest {
        rating: form.rating,
        comment: form.comment.trim().to_string(),
    };

    match state
        .api()
        .update_review(&user.token, &review_id, &request)
        .await
    {
        Ok(_) => Redirect::to(&format!("/products/{product_id}?success=review-updated")),
        Err(e) => {
            tracing::error!("Failed to update review {review_id}: {e}");
            Redirect::to(&format!("/products/{product_id}?error=review"))
        }
    }
}

/// Delete the customer's own review.
#[instrument(skip(state, user))]
pub async fn delete_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((product_id, review_id)): Path<(ProductId, ReviewId)>,
) -> Redirect {
    match state.api().delete_review(&user.token, &review_id).await {
        Ok(()) => Redirect::to(&format!("/products/{product_id}?success=review-deleted")),
        Err(e) => {
            tracing::error!("Failed to delete review {review_id}: {e}");
            Redirect::to(&format!("/products/{product_id}?error=review"))
        }
    }
}

/// Check review form fields, returning the error code for the redirect.
fn validate_review(form: &ReviewForm) -> std::result::Result<(), &'static str> {
    if !(1..=5).contains(&form.rating) {
        return Err("rating");
    }
    if form.comment.trim().is_empty() {
        return Err("comment");
    }
    Ok(())
}
