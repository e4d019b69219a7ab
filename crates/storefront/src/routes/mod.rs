//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product catalog with filters
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products/{id}          - Product detail with reviews
//! POST /products/{id}/reviews  - Post a review (auth)
//! POST /products/{id}/reviews/{review_id}        - Edit own review (auth)
//! POST /products/{id}/reviews/{review_id}/delete - Delete own review (auth)
//!
//! # Cart (HTMX fragments, auth)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (auth)
//! GET  /checkout               - Address + payment selection
//! POST /checkout/address       - Save a new delivery address
//! GET  /checkout/cities        - City options for a state (fragment)
//! GET  /checkout/postal-codes  - Postal code options for a city (fragment)
//! POST /checkout/place-order   - COD: create order; Online: open payment page
//! POST /checkout/payment/confirm - Gateway widget success callback
//! POST /checkout/payment/cancel  - Gateway widget dismissed
//!
//! # Orders (auth)
//! GET  /orders                 - Order history, paginated
//! GET  /order-success/{id}     - Order confirmation
//!
//! # Wishlist (auth)
//! GET  /wishlist               - Wishlist page
//! POST /wishlist/add           - Add a product
//! POST /wishlist/{id}/note     - Update the note on an entry
//! POST /wishlist/{id}/remove   - Remove an entry
//!
//! # Account (auth)
//! GET  /account                - Profile and saved addresses
//! POST /account/profile        - Update the display name
//! POST /account/addresses      - Save a new address
//! POST /account/addresses/{id} - Update an address
//! POST /account/addresses/{id}/delete - Delete an address
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/signup            - Signup page
//! POST /auth/signup            - Signup action
//! GET  /auth/verify-otp        - OTP entry page
//! POST /auth/verify-otp        - OTP verification action
//! POST /auth/resend-otp        - Resend the OTP email
//! GET  /auth/forgot-password   - Forgot password page
//! POST /auth/forgot-password   - Send the reset email
//! GET  /auth/reset-password    - Reset page (from the emailed link)
//! POST /auth/reset-password    - Reset action
//! POST /auth/logout            - Logout action
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show))
        .route("/{id}/reviews", post(products::create_review))
        .route("/{id}/reviews/{review_id}", post(products::update_review))
        .route(
            "/{id}/reviews/{review_id}/delete",
            post(products::delete_review),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/address", post(checkout::create_address))
        .route("/cities", get(checkout::cities))
        .route("/postal-codes", get(checkout::postal_codes))
        .route("/place-order", post(checkout::place_order))
        .route("/payment/confirm", post(checkout::confirm_payment))
        .route("/payment/cancel", post(checkout::cancel_payment))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index))
        .route("/add", post(wishlist::add))
        .route("/{id}/note", post(wishlist::update_note))
        .route("/{id}/remove", post(wishlist::remove))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/profile", post(account::update_profile))
        .route("/addresses", post(account::create_address))
        .route("/addresses/{id}", post(account::update_address))
        .route("/addresses/{id}/delete", post(account::delete_address))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route(
            "/verify-otp",
            get(auth::verify_otp_page).post(auth::verify_otp),
        )
        .route("/resend-otp", post(auth::resend_otp))
        .route(
            "/forgot-password",
            get(auth::forgot_password_page).post(auth::forgot_password),
        )
        .route(
            "/reset-password",
            get(auth::reset_password_page).post(auth::reset_password),
        )
        .route("/logout", post(auth::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Order history and confirmation
        .route("/orders", get(orders::index))
        .route("/order-success/{id}", get(orders::success))
        // Wishlist routes
        .nest("/wishlist", wishlist_routes())
        // Account routes
        .nest("/account", account_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
