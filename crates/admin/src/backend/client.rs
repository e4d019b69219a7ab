//! Admin commerce API client implementation.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::instrument;

use fortynine_core::api::{
    ApiMessage, AuthResponse, LoginRequest, Order, Page, SaveLocationRequest,
    UpdateOrderStatusRequest,
};
use fortynine_core::location::{LocationDirectory, LocationRecord};
use fortynine_core::types::{LocationId, OrderId, OrderStatus};

use super::ApiError;

/// Header carrying the collection size on paginated list responses.
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Search, filter, sort, and pagination for the admin order listing.
///
/// Maps one-to-one onto the query string of `GET /orders`.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    /// Substring match against order ids.
    pub search_id: Option<String>,
    /// Restrict to a single lifecycle status.
    pub filter_status: Option<OrderStatus>,
    /// Creation-date order: `asc` or `desc`. Backend default is `desc`.
    pub sort_order: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl OrderListQuery {
    /// Build the query-string pairs, omitting unset fields.
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search_id) = &self.search_id {
            pairs.push(("searchId", search_id.clone()));
        }
        if let Some(status) = self.filter_status {
            pairs.push(("filterStatus", status.as_str().to_string()));
        }
        if let Some(sort_order) = &self.sort_order {
            pairs.push(("sortOrder", sort_order.clone()));
        }
        pairs
    }
}

/// Client for the commerce REST API's admin endpoints.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AdminApiClient {
    inner: Arc<AdminApiClientInner>,
}

struct AdminApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminApiClient {
    /// Create a new admin API client.
    ///
    /// `base_url` must not have a trailing slash (config strips it).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: Arc::new(AdminApiClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
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

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ApiError::Unauthorized);
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
        let response = self
            .inner
            .client
            .get(self.url("api/locations"))
            .send()
            .await?;
        Self::discard(response).await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in with email and password.
    ///
    /// The caller must still check `is_admin` on the returned user; the
    /// login endpoint is shared with the storefront.
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

    // =========================================================================
    // Orders
    // =========================================================================

    /// List orders across all customers for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn list_orders(
        &self,
        token: &str,
        query: &OrderListQuery,
    ) -> Result<Page<Order>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("orders"))
            .query(&query.query_pairs())
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode_page(response).await
    }

    /// Move an order to a new lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(order = %order_id, status = %status))]
    pub async fn update_order_status(
        &self,
        token: &str,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let response = self
            .inner
            .client
            .patch(self.url(&format!("orders/{order_id}")))
            .bearer_auth(token)
            .json(&UpdateOrderStatusRequest { status })
            .send()
            .await?;
        Self::decode(response).await
    }

    // =========================================================================
    // Locations
    // =========================================================================

    /// Get the serviceable-location directory, nested as
    /// state -> city -> postal codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_locations(&self) -> Result<LocationDirectory, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("api/locations"))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// List location records as flat rows, optionally narrowed by state
    /// and city.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn filter_locations(
        &self,
        token: &str,
        state: Option<&str>,
        city: Option<&str>,
    ) -> Result<Vec<LocationRecord>, ApiError> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(state) = state {
            pairs.push(("state", state.to_string()));
        }
        if let Some(city) = city {
            pairs.push(("city", city.to_string()));
        }

        let response = self
            .inner
            .client
            .get(self.url("api/locations/filter"))
            .query(&pairs)
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Add a serviceable city.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request))]
    pub async fn create_location(
        &self,
        token: &str,
        request: &SaveLocationRequest,
    ) -> Result<LocationRecord, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("api/locations"))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Replace a location record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token, request), fields(location = %location_id))]
    pub async fn update_location(
        &self,
        token: &str,
        location_id: &LocationId,
        request: &SaveLocationRequest,
    ) -> Result<LocationRecord, ApiError> {
        let response = self
            .inner
            .client
            .put(self.url(&format!("api/locations/{location_id}")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Remove a serviceable city.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token), fields(location = %location_id))]
    pub async fn delete_location(
        &self,
        token: &str,
        location_id: &LocationId,
    ) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.url(&format!("api/locations/{location_id}")))
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
        let client = AdminApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("orders"), "http://localhost:8080/api/orders");
        assert_eq!(
            client.url("api/locations/loc1"),
            "http://localhost:8080/api/api/locations/loc1"
        );
    }

    #[test]
    fn test_order_query_pairs_always_paginate() {
        let query = OrderListQuery {
            page: 2,
            limit: 10,
            ..OrderListQuery::default()
        };
        assert_eq!(
            query.query_pairs(),
            vec![("page", "2".to_string()), ("limit", "10".to_string())]
        );
    }

    #[test]
    fn test_order_query_pairs_full() {
        let query = OrderListQuery {
            search_id: Some("664f".to_string()),
            filter_status: Some(OrderStatus::OutForDelivery),
            sort_order: Some("asc".to_string()),
            page: 1,
            limit: 10,
        };
        let pairs = query.query_pairs();
        assert!(pairs.contains(&("searchId", "664f".to_string())));
        assert!(pairs.contains(&("filterStatus", "Out for delivery".to_string())));
        assert!(pairs.contains(&("sortOrder", "asc".to_string())));
    }
}
