//! Integration tests for the storefront cart and checkout flows.
//!
//! These tests require:
//! - The commerce API running and reachable from the storefront
//! - The storefront server running (cargo run -p fortynine-storefront)
//! - A verified customer account (`TEST_USER_EMAIL` / `TEST_USER_PASSWORD`)
//! - An existing product id in `TEST_PRODUCT_ID`
//!
//! Run with: cargo test -p fortynine-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};

/// Base URL for the storefront (configurable via environment).
fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn test_product_id() -> String {
    std::env::var("TEST_PRODUCT_ID").expect("TEST_PRODUCT_ID not set")
}

/// A cookie-holding client that does not follow redirects, so tests can
/// assert on `Location` headers.
fn manual_redirect_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Log the test customer in and return the client holding its session.
async fn logged_in_client() -> Client {
    let email = std::env::var("TEST_USER_EMAIL").expect("TEST_USER_EMAIL not set");
    let password = std::env::var("TEST_USER_PASSWORD").expect("TEST_USER_PASSWORD not set");

    let client = manual_redirect_client();
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER, "login should redirect");
    let location = location_header(&resp);
    assert_eq!(location, "/", "login should land on the home page");
    client
}

fn location_header(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .expect("missing Location header")
        .to_str()
        .expect("non-UTF8 Location header")
        .to_string()
}

/// Read the nav badge fragment. The badge is omitted entirely for an
/// empty cart, so a missing `cart-badge` span means zero.
async fn cart_count(client: &Client) -> u64 {
    let base_url = storefront_base_url();
    let resp = client
        .get(format!("{base_url}/cart/count"))
        .send()
        .await
        .expect("Failed to get cart count");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read cart count");
    body.split("cart-badge\">")
        .nth(1)
        .and_then(|rest| rest.split('<').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

// ============================================================================
// Health & Public Pages
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_endpoints() {
    let client = manual_redirect_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_home_page_lists_products() {
    let client = manual_redirect_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .expect("Failed to get home page");
    assert_eq!(resp.status(), StatusCode::OK);

    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("49 Stores"));
    assert!(body.contains("/products/"), "home page should link products");
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_requires_login() {
    let client = manual_redirect_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout page");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location_header(&resp).starts_with("/auth/login"));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and a verified test account"]
async fn test_cart_add_update_remove() {
    let client = logged_in_client().await;
    let base_url = storefront_base_url();
    let product_id = test_product_id();

    let before = cart_count(&client).await;

    // Add-to-cart answers with the refreshed badge fragment for HTMX.
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str()), ("quantity", "2")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let trigger = resp
        .headers()
        .get("hx-trigger")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(trigger, "cart-updated");

    let after = cart_count(&client).await;
    assert!(after > before, "the badge should grow after adding to cart");
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running storefront server and a verified test account"]
async fn test_place_order_rejects_cart_below_minimum() {
    let client = logged_in_client().await;
    let base_url = storefront_base_url();
    let product_id = test_product_id();

    // One unit of any product should sit under the minimum order value.
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str()), ("quantity", "1")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let checkout = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout page");
    assert_eq!(checkout.status(), StatusCode::OK);
    let page = checkout.text().await.expect("Failed to read checkout page");

    // The first saved address id appears as a radio input value.
    let address_id = page
        .split("name=\"address_id\" value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("checkout page lists no saved address")
        .to_string();

    let resp = client
        .post(format!("{base_url}/checkout/place-order"))
        .form(&[("address_id", address_id.as_str()), ("payment_mode", "cash")])
        .send()
        .await
        .expect("Failed to place order");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&resp), "/checkout?error=below-minimum");
}

#[tokio::test]
#[ignore = "Requires running storefront server and a verified test account"]
async fn test_cod_checkout_places_order() {
    let client = logged_in_client().await;
    let base_url = storefront_base_url();
    let product_id = test_product_id();

    // Pile on enough units to clear the minimum order value.
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product_id.as_str()), ("quantity", "20")])
        .send()
        .await
        .expect("Failed to add to cart");
    assert_eq!(resp.status(), StatusCode::OK);

    let checkout = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout page");
    assert_eq!(checkout.status(), StatusCode::OK);
    let page = checkout.text().await.expect("Failed to read checkout page");

    let address_id = page
        .split("name=\"address_id\" value=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("checkout page lists no saved address")
        .to_string();

    let resp = client
        .post(format!("{base_url}/checkout/place-order"))
        .form(&[("address_id", address_id.as_str()), ("payment_mode", "cash")])
        .send()
        .await
        .expect("Failed to place order");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = location_header(&resp);
    assert!(
        location.starts_with("/order-success/"),
        "COD order should land on the success page, got {location}"
    );

    // The new order shows up at the top of the history.
    let order_id = location
        .rsplit('/')
        .next()
        .expect("success URL has no order id");
    let resp = client
        .get(format!("{base_url}/orders"))
        .send()
        .await
        .expect("Failed to get order history");
    assert_eq!(resp.status(), StatusCode::OK);
    let history = resp.text().await.expect("Failed to read order history");
    assert!(history.contains(order_id), "order history should list the new order");
    assert!(history.contains("Cash on Delivery"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and a verified test account"]
async fn test_invalid_address_is_rejected() {
    let client = logged_in_client().await;
    let base_url = storefront_base_url();

    // A state/city/PIN path the location table cannot contain.
    let resp = client
        .post(format!("{base_url}/checkout/address"))
        .form(&[
            ("type", "Home"),
            ("street", "12 Nowhere Lane"),
            ("country", "India"),
            ("phoneNumber", "9876543210"),
            ("state", "Atlantis"),
            ("city", "Underwater"),
            ("postalCode", "000000"),
        ])
        .send()
        .await
        .expect("Failed to post address");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&resp), "/checkout?error=location");
}
