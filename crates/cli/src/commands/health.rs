//! Ping the commerce API.

use tracing::info;

/// Hit the public locations endpoint and report whether the backend answers.
///
/// # Errors
///
/// Returns an error if `COMMERCE_API_URL` is unset or the request fails.
pub async fn check() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let base = std::env::var("COMMERCE_API_URL").map_err(|_| "COMMERCE_API_URL not set")?;
    let base = base.trim_end_matches('/');

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{base}/api/locations"))
        .send()
        .await?;

    let status = response.status();
    if status.is_success() {
        info!(%status, "Commerce API is reachable");
        Ok(())
    } else {
        Err(format!("Commerce API answered with {status}").into())
    }
}
