//! Commerce API client implementation.
//!
//! Thin typed wrapper over the REST endpoints using `reqwest` 0.13.
//! Catalog lookups and the location directory are cached with `moka`
//! (5-minute TTL); customer-scoped data is never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use fortynine_core::api::{
    Address, AddToCartRequest, ApiMessage, AuthResponse, Brand, CartItem, Category,
    CreateAddressRequest, CreateGatewayOrderRequest, CreateOrderRequest, CreateReviewRequest,
    CreateWishlistItemRequest, ForgotPasswordRequest, GatewayOrderResponse, LoginRequest, Order,
    Page, Product, ResendOtpRequest, ResetPasswordRequest, Review, SignupRequest,
    UpdateCartItemRequest, UpdateReviewRequest, UpdateUserRequest, UpdateWishlistItemRequest, User,
    VerifyOtpRequest, WishlistItem,
};
use fortynine_core::location::{AddressDraft, LocationDirectory};
use fortynine_core::types::{AddressId, CartItemId, ProductId, ReviewId, UserId, WishlistItemId};

use super::ApiError;
use super::cache::CacheValue;

/// Header carrying the collection size on paginated list responses.
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Header carrying the client-generated key that makes order creation
/// safe to retry.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

// =============================================================================
// Product queries
// =============================================================================

/// Sort key for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Price,
    CreatedAt,
}

impl ProductSort {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::CreatedAt => "createdAt",
        }
    }
}

/// Sort direction for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filters, sorting, and pagination for `GET /products`.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sort: Option<ProductSort>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// Build the query-string pairs, omitting unset fields.
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.as_str().to_string()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cheaply cloneable via `Arc`. Catalog and location reads are cached for
/// 5 minutes; everything else goes straight to the API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new commerce API client.
    ///
    /// `base_url` must not have a trailing slash (config strips it).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Map a non-success response into an `ApiError`, pulling the message
    /// out of the standard `{"message": ...}` error body when present.
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |m| m.message,
        );

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(message));
        }

        tracing::error!(
            status = %status,
            message = %message,
            "Commerce API returned non-success status"
        );
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Check the status and decode the JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::check_status(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Check the status and decode a list body plus its `X-Total-Count`.
    async fn decode_page<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Page<T>, ApiError> {
        let response = Self::check_status(response).await?;
        let header_total = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let text = response.text().await?;
        let items: Vec<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse commerce API list response"
            );
            ApiError::Parse(e)
        })?;

        let total = header_total
            .unwrap_or_else(|| u64::try_from(items.len()).unwrap_or(u64::MAX));
        Ok(Page { items, total })
    }

    /// Check the status and discard the body.
    async fn discard(response: reqwest::Response) -> Result<(), ApiError> {
        Self::check_status(response).await?;
        Ok(())
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Verify the API is reachable. Used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self.inner.client.get(self.url("brands")).send().await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products with optional filters, sorting, and pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, query: &ProductQuery) -> Result<Page<Product>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("products"))
            .query(&query.query_pairs())
            .send()
            .await?;
        Self::decode_page(response).await
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the request fails.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let response = self
            .inner
            .client
            .get(self.url(&format!("products/{product_id}")))
            .send()
            .await?;
        let product: Product = Self::decode(response).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List all brands (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get("brands").await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let response = self.inner.client.get(self.url("brands")).send().await?;
        let brands: Vec<Brand> = Self::decode(response).await?;

        self.inner
            .cache
            .insert("brands".to_string(), CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// List all categories (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get("categories").await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let response = self.inner.client.get(self.url("categories")).send().await?;
        let categories: Vec<Category> = Self::decode(response).await?;

        self.inner
            .cache
            .insert(
                "categories".to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;

        Ok(categories)
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Get the serviceable-location directory, nested as
    /// state -> city -> postal codes (cached).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_locations(&self) -> Result<LocationDirectory, ApiError> {
        if let Some(CacheValue::Locations(directory)) = self.inner.cache.get("locations").await {
            debug!("Cache hit for locations");
            return Ok(directory);
        }

        let response = self
            .inner
            .client
            .get(self.url("api/locations"))
            .send()
            .await?;
        let directory: LocationDirectory = Self::decode(response).await?;

        self.inner
            .cache
            .insert(
                "locations".to_string(),
                CacheValue::Locations(directory.clone()),
            )
            .await;

        Ok(directory)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new customer account. Triggers an OTP email.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken or the request fails.
    #[instrument(skip(self, request))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/signup"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/login"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Verify the signup OTP and activate the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the OTP is wrong or expired.
    #[instrument(skip(self, request))]
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<AuthResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/verify-otp"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Send a fresh OTP to the given email.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn resend_otp(&self, request: &ResendOtpRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/resend-otp"))
            .json(request)
            .send()
            .await?;
        Self::discard(response).await
    }

    /// Start a password reset. Always succeeds for unknown emails.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/forgot-password"))
            .json(request)
            .send()
            .await?;
        Self::discard(response).await
    }

    /// Complete a password reset with the emailed token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or expired.
    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("auth/reset-password"))
            .json(request)
            .send()
            .await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Fetch the customer's cart lines, products populated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn get_cart(&self, token: &str, user_id: &UserId) -> Result<Vec<CartItem>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("cart/user/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Add a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        request: &AddToCartRequest,
    ) -> Result<CartItem, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("cart"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Change the quantity on a cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(item = %item_id))]
    pub async fn update_cart_item(
        &self,
        token: &str,
        item_id: &CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("cart/{item_id}")))
            .bearer_auth(token)
            .json(&UpdateCartItemRequest { quantity })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Remove a single cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(item = %item_id))]
    pub async fn remove_cart_item(&self, token: &str, item_id: &CartItemId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("cart/{item_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::discard(response).await
    }

    /// Remove every line in the customer's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn clear_cart(&self, token: &str, user_id: &UserId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("cart/user/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch the customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn get_user(&self, token: &str, user_id: &UserId) -> Result<User, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("users/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Update the customer's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request), fields(user = %user_id))]
    pub async fn update_user(
        &self,
        token: &str,
        user_id: &UserId,
        request: &UpdateUserRequest,
    ) -> Result<User, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("users/{user_id}")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the customer's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn get_addresses(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<Vec<Address>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("address/user/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn create_address(
        &self,
        token: &str,
        request: &CreateAddressRequest,
    ) -> Result<Address, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("address"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Update a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, draft), fields(address = %address_id))]
    pub async fn update_address(
        &self,
        token: &str,
        address_id: &AddressId,
        draft: &AddressDraft,
    ) -> Result<Address, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("address/{address_id}")))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(address = %address_id))]
    pub async fn delete_address(&self, token: &str, address_id: &AddressId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("address/{address_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Register a payment session with the gateway for the given amount.
    /// Returns the gateway order the widget must be opened with.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway or API rejects the request.
    #[instrument(skip(self, token, request))]
    pub async fn create_gateway_order(
        &self,
        token: &str,
        request: &CreateGatewayOrderRequest,
    ) -> Result<GatewayOrderResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("orders/create-razorpay-order"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Create an order. The idempotency key makes retries safe: the API
    /// returns the already-created order instead of a duplicate.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request), fields(idempotency_key = %idempotency_key))]
    pub async fn create_order(
        &self,
        token: &str,
        request: &CreateOrderRequest,
        idempotency_key: &str,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("orders"))
            .bearer_auth(token)
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List the customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn get_user_orders(
        &self,
        token: &str,
        user_id: &UserId,
        page: u32,
        limit: u32,
    ) -> Result<Page<Order>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("orders/user/{user_id}")))
            .query(&[("page", page.to_string()), ("limit", limit.to_string())])
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode_page(response).await
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// List reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn get_product_reviews(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Review>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("reviews/product/{product_id}")))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Post a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn create_review(
        &self,
        token: &str,
        request: &CreateReviewRequest,
    ) -> Result<Review, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("reviews"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Edit a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request), fields(review = %review_id))]
    pub async fn update_review(
        &self,
        token: &str,
        review_id: &ReviewId,
        request: &UpdateReviewRequest,
    ) -> Result<Review, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("reviews/{review_id}")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(review = %review_id))]
    pub async fn delete_review(&self, token: &str, review_id: &ReviewId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("reviews/{review_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// List the customer's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn get_wishlist(
        &self,
        token: &str,
        user_id: &UserId,
        page: u32,
        limit: u32,
    ) -> Result<Page<WishlistItem>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("wishlist/user/{user_id}")))
            .query(&[("page", page.to_string()), ("limit", limit.to_string())])
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode_page(response).await
    }

    /// Add a product to the wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn add_to_wishlist(
        &self,
        token: &str,
        request: &CreateWishlistItemRequest,
    ) -> Result<WishlistItem, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("wishlist"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Update the note on a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(item = %item_id))]
    pub async fn update_wishlist_note(
        &self,
        token: &str,
        item_id: &WishlistItemId,
        note: String,
    ) -> Result<WishlistItem, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("wishlist/{item_id}")))
            .bearer_auth(token)
            .json(&UpdateWishlistItemRequest { note })
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Remove a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(item = %item_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &str,
        item_id: &WishlistItemId,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("wishlist/{item_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::discard(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("products"), "http://localhost:8080/api/products");
        assert_eq!(
            client.url("orders/user/u1"),
            "http://localhost:8080/api/orders/user/u1"
        );
    }

    #[test]
    fn test_product_query_pairs_omit_unset_fields() {
        let query = ProductQuery {
            brand: Some("b1".to_string()),
            page: Some(2),
            ..ProductQuery::default()
        };
        let pairs = query.query_pairs();
        assert_eq!(
            pairs,
            vec![("brand", "b1".to_string()), ("page", "2".to_string())]
        );
    }

    #[test]
    fn test_product_query_pairs_full() {
        let query = ProductQuery {
            brand: Some("b1".to_string()),
            category: Some("c1".to_string()),
            sort: Some(ProductSort::Price),
            order: Some(SortOrder::Desc),
            page: Some(1),
            limit: Some(12),
        };
        let pairs = query.query_pairs();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.contains(&("sort", "price".to_string())));
        assert!(pairs.contains(&("order", "desc".to_string())));
    }

    #[test]
    fn test_sort_wire_names() {
        assert_eq!(ProductSort::Price.as_str(), "price");
        assert_eq!(ProductSort::CreatedAt.as_str(), "createdAt");
        assert_eq!(SortOrder::Asc.as_str(), "asc");
        assert_eq!(SortOrder::Desc.as_str(), "desc");
    }
}
