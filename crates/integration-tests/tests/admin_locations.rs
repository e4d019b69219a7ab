//! Integration tests for serviceable-location management.
//!
//! These tests require:
//! - The commerce API running and reachable from the admin server
//! - The admin server running (cargo run -p fortynine-admin)
//! - A staff account in `ADMIN_EMAIL` / `ADMIN_PASSWORD`
//!
//! Run with: cargo test -p fortynine-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};
use uuid::Uuid;

/// Base URL for the admin panel (configurable via environment).
fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

fn manual_redirect_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

fn location_header(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("location")
        .expect("missing Location header")
        .to_str()
        .expect("non-UTF8 Location header")
        .to_string()
}

async fn staff_client() -> Client {
    let email = std::env::var("ADMIN_EMAIL").expect("ADMIN_EMAIL not set");
    let password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD not set");

    let client = manual_redirect_client();
    let base_url = admin_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    client
}

/// A city name that cannot collide with real data.
fn test_city() -> String {
    format!("Testville-{}", Uuid::new_v4().simple())
}

/// Fetch the locations page filtered to one city and return the HTML.
async fn city_page(client: &Client, city: &str) -> String {
    let base_url = admin_base_url();
    let resp = client
        .get(format!("{base_url}/locations?city={city}"))
        .send()
        .await
        .expect("Failed to get locations page");
    assert_eq!(resp.status(), StatusCode::OK);
    resp.text().await.expect("Failed to read response")
}

/// Pull the record id out of the city row's edit-form action.
fn record_id(page: &str) -> String {
    page.split("action=\"/locations/")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .expect("locations page lists no record")
        .to_string()
}

// ============================================================================
// CRUD round trip
// ============================================================================

#[tokio::test]
#[ignore = "Requires running admin server and a staff account"]
async fn test_location_create_update_delete() {
    let client = staff_client().await;
    let base_url = admin_base_url();
    let city = test_city();

    // Create.
    let resp = client
        .post(format!("{base_url}/locations"))
        .form(&[
            ("state", "Test State"),
            ("city", city.as_str()),
            ("postal_codes", "410206, 410207"),
        ])
        .send()
        .await
        .expect("Failed to create location");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location_header(&resp).contains("saved="));

    let page = city_page(&client, &city).await;
    assert!(page.contains(&city), "new city should appear in the table");
    assert!(page.contains("410206, 410207"));
    let id = record_id(&page);

    // Update the postal codes.
    let resp = client
        .post(format!("{base_url}/locations/{id}"))
        .form(&[
            ("state", "Test State"),
            ("city", city.as_str()),
            ("postal_codes", "410210"),
        ])
        .send()
        .await
        .expect("Failed to update location");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let page = city_page(&client, &city).await;
    assert!(page.contains("410210"));
    assert!(!page.contains("410206"), "old postal codes should be replaced");

    // Delete.
    let resp = client
        .post(format!("{base_url}/locations/{id}/delete"))
        .send()
        .await
        .expect("Failed to delete location");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let page = city_page(&client, &city).await;
    assert!(!page.contains(&city), "deleted city should disappear");
}

#[tokio::test]
#[ignore = "Requires running admin server and a staff account"]
async fn test_location_create_rejects_blank_fields() {
    let client = staff_client().await;
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/locations"))
        .form(&[("state", ""), ("city", "Panvel"), ("postal_codes", "410206")])
        .send()
        .await
        .expect("Failed to post location");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location_header(&resp), "/locations?error=fields");
}
