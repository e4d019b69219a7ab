//! HTTP route handlers for the admin panel.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Redirect to /orders
//! GET  /health                   - Health check
//!
//! # Orders (admin)
//! GET  /orders                   - Order dashboard (search, filter, sort, paginate)
//! POST /orders/{id}/status       - Move an order to a new status
//!
//! # Locations (admin)
//! GET  /locations                - Serviceable locations, filterable by state/city
//! POST /locations                - Add a serviceable city
//! POST /locations/{id}           - Update a location record
//! POST /locations/{id}/delete    - Remove a location record
//!
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login action (admin accounts only)
//! POST /auth/logout              - Logout action
//! ```

pub mod auth;
pub mod locations;
pub mod orders;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}/status", post(orders::update_status))
}

/// Create the location routes router.
pub fn location_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(locations::index).post(locations::create))
        .route("/{id}", post(locations::update))
        .route("/{id}/delete", post(locations::delete))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        // The dashboard is the landing page
        .route("/", get(|| async { Redirect::to("/orders") }))
        .nest("/orders", order_routes())
        .nest("/locations", location_routes())
        .nest("/auth", auth_routes())
}
