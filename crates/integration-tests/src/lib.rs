//! Integration tests for 49 Stores.
//!
//! The tests in `tests/` drive the real servers over HTTP and are all
//! marked `#[ignore]`; run them explicitly once the stack is up.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the commerce API, then both servers
//! cargo run -p fortynine-storefront
//! cargo run -p fortynine-admin
//!
//! # Run the ignored integration tests
//! cargo test -p fortynine-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `STOREFRONT_BASE_URL` - storefront server (default `http://localhost:3000`)
//! - `ADMIN_BASE_URL` - admin server (default `http://localhost:3001`)
//! - `TEST_USER_EMAIL` / `TEST_USER_PASSWORD` - a verified customer account
//! - `TEST_PRODUCT_ID` - a product that exists in the catalog
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - a staff account
//!
//! # Test Categories
//!
//! - `storefront_checkout` - cart, checkout and order placement flows
//! - `admin_dashboard` - staff login and the orders dashboard
//! - `admin_locations` - serviceable-location CRUD
